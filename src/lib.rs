pub mod app;
pub mod config;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod storage;
pub mod state;

pub use app::router;
pub use config::ServerConfig;
pub use format::{format_duration, format_playtime};
pub use normalize::{
    normalize_behavior, normalize_dashboard, normalize_platform, normalize_sessions,
    normalize_time_series, normalize_top_entities,
};
pub use state::AppState;
pub use storage::load_document;
