//! Viewer page handler.

use axum::extract::State;
use axum::response::Html;

use relay_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
///
/// The viewer page, read from the static directory.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.config.web.index_path();
    let page = tokio::fs::read_to_string(&path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Index page unavailable");
        AppError::not_found(format!("Index page not found: {}", path.display()))
    })?;
    Ok(Html(page))
}
