//! Presence snapshot handler.

use axum::Json;
use axum::extract::State;

use relay_realtime::PresenceSnapshot;

use crate::state::AppState;

/// GET /api/presence
///
/// Returns the same object observers receive.
pub async fn current(State(state): State<AppState>) -> Json<PresenceSnapshot> {
    Json(state.engine.snapshot().await)
}
