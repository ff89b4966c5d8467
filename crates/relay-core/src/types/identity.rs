//! Resolved identity of the tracked account.

use serde::{Deserialize, Serialize};

use super::id::AccountId;

/// An account the session managed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Network-assigned ID, used to filter the live event feed.
    pub id: AccountId,
    /// Name the network reports for the account, if any.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Identity {
    /// Create an identity with no reported name.
    pub fn new(id: impl Into<AccountId>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }

    /// Attach the reported display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}
