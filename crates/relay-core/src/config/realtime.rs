//! Observer push channel configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) observer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound buffer per observer. An observer whose buffer is full is
    /// considered stalled and dropped.
    #[serde(default = "default_observer_buffer")]
    pub observer_buffer_size: usize,
    /// Maximum concurrent observers (0 = unlimited).
    #[serde(default)]
    pub max_observers: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            observer_buffer_size: default_observer_buffer(),
            max_observers: 0,
        }
    }
}

fn default_observer_buffer() -> usize {
    32
}
