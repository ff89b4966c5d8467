//! # relay-realtime
//!
//! Presence engine for the relay. Provides:
//!
//! - The presence store holding the single current snapshot
//! - A cancellable debounce controller for provisional offline reports
//! - The presence state machine and the tracker worker that drives it
//! - The observer pool and broadcast hub that fan snapshots out
//! - Engine-level metrics counters

pub mod metrics;
pub mod observer;
pub mod presence;
pub mod server;

pub use metrics::{MetricsSnapshot, RelayMetrics};
pub use observer::hub::BroadcastHub;
pub use presence::snapshot::PresenceSnapshot;
pub use presence::status::PresenceStatus;
pub use presence::store::PresenceStore;
pub use presence::worker::{TrackerState, TrackerWorker};
pub use server::RealtimeEngine;
