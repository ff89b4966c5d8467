//! Account session gateway configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for the bridge that holds the messaging-network session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base HTTP URL of the gateway, e.g. `http://127.0.0.1:9000`.
    #[serde(default)]
    pub base_url: String,
    /// WebSocket URL of the live update feed. Derived from `base_url`
    /// (`/v1/updates`) when not set.
    #[serde(default)]
    pub updates_url: Option<String>,
    /// Application ID issued by the messaging network.
    #[serde(default)]
    pub api_id: i64,
    /// Application hash issued by the messaging network.
    #[serde(default)]
    pub api_hash: String,
    /// Name of the authorized session on the gateway.
    #[serde(default = "default_session_name")]
    pub session_name: String,
    /// Timeout for lookup requests in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            updates_url: None,
            api_id: 0,
            api_hash: String::new(),
            session_name: default_session_name(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl GatewayConfig {
    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// The update feed URL, explicit or derived from `base_url`.
    pub fn resolved_updates_url(&self) -> String {
        if let Some(url) = &self.updates_url {
            return url.clone();
        }
        let base = self.base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        format!("{ws_base}/v1/updates")
    }
}

fn default_session_name() -> String {
    "tracker".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updates_url_derived_from_http() {
        let config = GatewayConfig {
            base_url: "http://127.0.0.1:9000/".to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(config.resolved_updates_url(), "ws://127.0.0.1:9000/v1/updates");
    }

    #[test]
    fn test_updates_url_derived_from_https() {
        let config = GatewayConfig {
            base_url: "https://gw.example.net".to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(config.resolved_updates_url(), "wss://gw.example.net/v1/updates");
    }

    #[test]
    fn test_explicit_updates_url_wins() {
        let config = GatewayConfig {
            base_url: "http://127.0.0.1:9000".to_string(),
            updates_url: Some("ws://10.0.0.2:7000/feed".to_string()),
            ..GatewayConfig::default()
        };
        assert_eq!(config.resolved_updates_url(), "ws://10.0.0.2:7000/feed");
    }
}
