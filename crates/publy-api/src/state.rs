//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use publy_core::config::AppConfig;
use publy_realtime::RelayEngine;

/// Application state passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Relay engine (channel registry, metrics, shutdown)
    pub relay: RelayEngine,
}

impl AppState {
    /// Builds the state and its relay engine from configuration.
    pub fn new(config: AppConfig) -> Self {
        let relay = RelayEngine::new(config.relay.clone());
        Self {
            config: Arc::new(config),
            relay,
        }
    }
}
