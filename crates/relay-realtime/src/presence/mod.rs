//! Presence tracking for the single target account.

pub mod debounce;
pub mod machine;
pub mod snapshot;
pub mod status;
pub mod store;
pub mod worker;

pub use machine::PresenceMachine;
pub use snapshot::PresenceSnapshot;
pub use status::PresenceStatus;
pub use store::PresenceStore;
pub use worker::{TrackerState, TrackerWorker};
