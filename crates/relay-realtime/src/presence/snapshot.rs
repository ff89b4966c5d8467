//! The presence snapshot pushed to observers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::PresenceStatus;

/// `last_seen` value sent while the time is unknown.
pub const LAST_SEEN_UNKNOWN: &str = "--";

/// Format of a known `last_seen` (UTC).
pub const LAST_SEEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Complete presence record. Always sent whole, never as a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    /// Display label of the tracked account.
    pub name: String,
    /// Current status.
    pub status: PresenceStatus,
    /// When the account was last seen. Only meaningful while offline.
    #[serde(with = "last_seen_format")]
    pub last_seen: Option<DateTime<Utc>>,
    /// Reserved for an "online for Xm" label; always empty.
    pub duration: String,
}

impl PresenceSnapshot {
    /// The initial snapshot, before the identity is resolved.
    pub fn connecting(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: PresenceStatus::Connecting,
            last_seen: None,
            duration: String::new(),
        }
    }

    pub(crate) fn mark_online(&mut self) {
        self.status = PresenceStatus::Online;
        self.last_seen = None;
        self.duration.clear();
    }

    pub(crate) fn mark_offline(&mut self, last_seen: Option<DateTime<Utc>>) {
        self.status = PresenceStatus::Offline;
        self.last_seen = last_seen;
        self.duration.clear();
    }

    /// `last_seen` as it appears on the wire.
    pub fn last_seen_label(&self) -> String {
        format_last_seen(self.last_seen.as_ref())
    }
}

/// Format a last-seen time, or the unknown sentinel.
pub fn format_last_seen(last_seen: Option<&DateTime<Utc>>) -> String {
    match last_seen {
        Some(at) => at.format(LAST_SEEN_FORMAT).to_string(),
        None => LAST_SEEN_UNKNOWN.to_string(),
    }
}

mod last_seen_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{LAST_SEEN_FORMAT, LAST_SEEN_UNKNOWN, format_last_seen};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_last_seen(value.as_ref()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == LAST_SEEN_UNKNOWN || raw.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(&raw, LAST_SEEN_FORMAT)
            .map(|naive| Some(naive.and_utc()))
            .map_err(serde::de::Error::custom)
    }
}
