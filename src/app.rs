use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/sections/:section", get(handlers::get_section))
        .route("/api/platform-usage", get(handlers::get_platform_usage))
        .with_state(state)
}
