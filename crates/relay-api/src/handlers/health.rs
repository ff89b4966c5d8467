//! Health check handler.

use axum::Json;
use axum::extract::State;

use relay_realtime::presence::worker::TrackerState;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let tracker = state.engine.tracker_state();
    let status = match tracker {
        TrackerState::Idle | TrackerState::Starting | TrackerState::Running => "ok",
        TrackerState::Stopped | TrackerState::Failed => "degraded",
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        tracker,
        observers: state.engine.hub.observer_count(),
        metrics: state.engine.metrics.snapshot(),
    }))
}
