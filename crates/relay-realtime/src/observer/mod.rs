//! Observer management: handles, the pool and snapshot fan-out.

pub mod handle;
pub mod hub;
pub mod pool;

pub use handle::{ObserverHandle, ObserverId, ObserverInfo, TransportSendError};
pub use hub::BroadcastHub;
pub use pool::ObserverPool;
