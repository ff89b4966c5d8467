//! Route handlers.

pub mod health;
pub mod index;
pub mod presence;
pub mod ws;
