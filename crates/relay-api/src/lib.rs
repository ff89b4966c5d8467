//! # relay-api
//!
//! HTTP layer for the presence relay built on Axum.
//!
//! Provides the observer WebSocket upgrade, the presence and health
//! endpoints, static viewer page serving, middleware (CORS, request
//! logging) and error mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
