//! Core type definitions used across the relay workspace.

pub mod id;
pub mod identity;

pub use id::AccountId;
pub use identity::Identity;
