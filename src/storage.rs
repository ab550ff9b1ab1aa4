use crate::errors::AppError;
use crate::models::RawAnalyticsDocument;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Loads the analytics document. A missing file is an empty dashboard,
/// anything unreadable or malformed is an error.
pub async fn load_document(path: &Path) -> Result<RawAnalyticsDocument, AppError> {
    match fs::read(path).await {
        Ok(bytes) => {
            debug!("read {} bytes from {}", bytes.len(), path.display());
            parse_document(&bytes)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("no data file at {}, serving an empty dashboard", path.display());
            Ok(RawAnalyticsDocument::default())
        }
        Err(err) => Err(AppError::internal(err)),
    }
}

pub fn parse_document(bytes: &[u8]) -> Result<RawAnalyticsDocument, AppError> {
    Ok(serde_json::from_slice(bytes)?)
}
