//! Tracked account and presence tracker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The single remote account whose presence is relayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Phone number or username used to look the account up.
    #[serde(default)]
    pub identifier: String,
    /// Display label pushed to observers, also used as the contact name
    /// when the account has to be imported.
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            identifier: String::new(),
            name: default_name(),
        }
    }
}

/// Presence state machine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// How long an offline report must stand before it is confirmed.
    #[serde(default = "default_offline_delay")]
    pub offline_delay_seconds: u64,
    /// Capacity of the state machine's mailbox.
    #[serde(default = "default_mailbox_size")]
    pub mailbox_size: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            offline_delay_seconds: default_offline_delay(),
            mailbox_size: default_mailbox_size(),
        }
    }
}

impl TrackerConfig {
    /// Debounce delay as a [`Duration`].
    pub fn offline_delay(&self) -> Duration {
        Duration::from_secs(self.offline_delay_seconds)
    }
}

fn default_name() -> String {
    "User".to_string()
}

fn default_offline_delay() -> u64 {
    40
}

fn default_mailbox_size() -> usize {
    64
}
