//! Presence status definitions.

use serde::{Deserialize, Serialize};

/// Relayed presence status of the tracked account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresenceStatus {
    /// The identity has not been resolved yet.
    Connecting,
    /// The account is online.
    Online,
    /// The account is offline (confirmed after the debounce delay).
    Offline,
}

impl PresenceStatus {
    /// Converts to the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "CONNECTING",
            Self::Online => "ONLINE",
            Self::Offline => "OFFLINE",
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
