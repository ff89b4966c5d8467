//! Route definitions for the relay's HTTP surface.
//!
//! JSON endpoints are mounted under `/api`; the observer socket lives at
//! `/ws` and the viewer page at `/` with its assets under `/static`.

use axum::Router;
use axum::middleware as axum_middleware;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/presence", get(handlers::presence::current))
        .route("/health", get(handlers::health::health));

    let static_files = ServeDir::new(&state.config.web.static_dir);
    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .route("/", get(handlers::index::index))
        .route("/ws", get(handlers::ws::ws_upgrade))
        .nest("/api", api_routes)
        .nest_service("/static", static_files)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
