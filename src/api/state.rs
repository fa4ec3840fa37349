use std::sync::Arc;

use crate::config::AppConfig;

/// Shared application state passed to all handlers via Axum's State extractor.
///
/// Read-only after startup: every request replays into its own `Position`.
pub struct AppState {
    pub config: AppConfig,
    pub start_time: std::time::Instant,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(AppState {
            config,
            start_time: std::time::Instant::now(),
        })
    }
}
