//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use relay_core::config::AppConfig;
use relay_realtime::server::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Presence engine
    pub engine: Arc<RealtimeEngine>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates the state around an engine.
    pub fn new(config: Arc<AppConfig>, engine: Arc<RealtimeEngine>) -> Self {
        Self {
            config,
            engine,
            started_at: Instant::now(),
        }
    }
}
