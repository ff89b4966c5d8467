//! Core traits defined in `relay-core` and implemented by other crates.

pub mod clock;
pub mod session;

pub use clock::{Clock, SystemClock};
pub use session::{AccountSession, StatusEventStream};
