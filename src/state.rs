use crate::models::RawAnalyticsDocument;
use std::sync::Arc;

/// The document is loaded once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub document: Arc<RawAnalyticsDocument>,
}

impl AppState {
    pub fn new(document: RawAnalyticsDocument) -> Self {
        Self {
            document: Arc::new(document),
        }
    }
}
