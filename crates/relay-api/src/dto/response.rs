//! Response DTOs.

use serde::{Deserialize, Serialize};

use relay_realtime::metrics::MetricsSnapshot;
use relay_realtime::presence::worker::TrackerState;

/// Standard success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` while the tracker is starting or running, `degraded` otherwise.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_seconds: u64,
    /// Tracker worker lifecycle state.
    pub tracker: TrackerState,
    /// Connected observers.
    pub observers: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}
