//! # relay-gateway
//!
//! Account session adapters for the presence relay:
//!
//! - [`GatewaySession`] talks to an HTTP/WebSocket bridge that holds the
//!   authorized messaging-network session
//! - [`MemorySession`] is a scriptable in-process session for tests and
//!   local development

pub mod http;
pub mod memory;
pub mod wire;

pub use http::GatewaySession;
pub use memory::MemorySession;
