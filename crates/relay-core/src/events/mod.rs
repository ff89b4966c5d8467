//! Raw account status events produced by an account session.
//!
//! These are the unfiltered updates coming off the messaging network. The
//! presence state machine is the only consumer; it drops events for any
//! account other than the tracked one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::AccountId;

/// Status of an account as reported by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AccountStatus {
    /// The account is online right now.
    Online,
    /// The account is offline. `was_online` is absent when the network
    /// hides the exact time.
    Offline {
        /// When the account was last seen online.
        #[serde(default)]
        was_online: Option<DateTime<Utc>>,
    },
}

impl AccountStatus {
    /// Offline with an unknown last-seen time.
    pub const fn offline_unknown() -> Self {
        Self::Offline { was_online: None }
    }

    /// Whether this status is [`AccountStatus::Online`].
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

/// A single status change pushed by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStatusEvent {
    /// Account the update concerns.
    #[serde(rename = "user_id")]
    pub account_id: AccountId,
    /// The new status.
    pub status: AccountStatus,
}

impl RawStatusEvent {
    /// An "became online" event.
    pub fn online(account_id: impl Into<AccountId>) -> Self {
        Self {
            account_id: account_id.into(),
            status: AccountStatus::Online,
        }
    }

    /// A "became offline" event.
    pub fn offline(account_id: impl Into<AccountId>) -> Self {
        Self {
            account_id: account_id.into(),
            status: AccountStatus::offline_unknown(),
        }
    }
}
