//! JSON shapes exchanged with the account gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use relay_core::events::{AccountStatus, RawStatusEvent};
use relay_core::types::{AccountId, Identity};

/// Body of `POST /v1/contacts/import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportContactRequest {
    /// Phone number or username to import.
    pub identifier: String,
    /// First name stored on the contact.
    pub first_name: String,
    /// Last name stored on the contact.
    #[serde(default)]
    pub last_name: String,
}

/// Response of `POST /v1/contacts/import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportContactResponse {
    /// Accounts that matched the imported contact.
    #[serde(default)]
    pub users: Vec<Identity>,
}

/// Status as the gateway reports it. The network knows more states than
/// online/offline (hidden, recently, within a week...), all of which
/// arrive here as [`GatewayStatus::Hidden`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GatewayStatus {
    /// Online now.
    Online,
    /// Offline, with the last-seen time when the network discloses it.
    Offline {
        /// Last time the account was online.
        #[serde(default)]
        was_online: Option<DateTime<Utc>>,
    },
    /// Any coarse or concealed status.
    #[serde(other)]
    Hidden,
}

impl GatewayStatus {
    /// Status used for the initial sync. A concealed status counts as
    /// offline with an unknown last-seen time.
    pub fn into_account_status(self) -> AccountStatus {
        match self {
            Self::Online => AccountStatus::Online,
            Self::Offline { was_online } => AccountStatus::Offline { was_online },
            Self::Hidden => AccountStatus::offline_unknown(),
        }
    }
}

/// One text frame of the update feed.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFrame {
    /// Account the update concerns.
    pub user_id: AccountId,
    /// Its new status.
    pub status: GatewayStatus,
}

/// Parse an update frame into a raw status event.
///
/// Frames that are not user-status updates, and concealed statuses, yield
/// `None`: only explicit online/offline transitions drive the tracker.
pub fn parse_update(text: &str) -> Option<RawStatusEvent> {
    let frame: UpdateFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::trace!(error = %e, "Skipping non-status update frame");
            return None;
        }
    };

    let status = match frame.status {
        GatewayStatus::Online => AccountStatus::Online,
        GatewayStatus::Offline { was_online } => AccountStatus::Offline { was_online },
        GatewayStatus::Hidden => return None,
    };

    Some(RawStatusEvent {
        account_id: frame.user_id,
        status,
    })
}
