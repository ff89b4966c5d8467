//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod gateway;
pub mod logging;
pub mod realtime;
pub mod tracker;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig, WebConfig};
pub use self::gateway::GatewayConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::tracker::{TargetConfig, TrackerConfig};

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "RELAY";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// The account whose presence is tracked.
    #[serde(default)]
    pub target: TargetConfig,
    /// Presence tracker settings.
    #[serde(default)]
    pub tracker: TrackerConfig,
    /// Account session gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Observer push channel settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Static page settings.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `RELAY__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_with(env, Self::environment())
    }

    /// Environment variable source. Values stay strings so that identifiers
    /// such as `+15550100` keep their leading `+` and zeros; numeric fields
    /// are converted during deserialization.
    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
    }

    fn load_with(env: &str, environment: config::Environment) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(environment)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Check the values that have no usable default.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.target.identifier.trim().is_empty() {
            return Err(AppError::configuration(
                "target.identifier must be set to the tracked account's phone or username",
            ));
        }
        if self.tracker.offline_delay_seconds == 0 {
            return Err(AppError::configuration(
                "tracker.offline_delay_seconds must be greater than zero",
            ));
        }
        if self.tracker.mailbox_size == 0 {
            return Err(AppError::configuration(
                "tracker.mailbox_size must be greater than zero",
            ));
        }
        if self.realtime.observer_buffer_size == 0 {
            return Err(AppError::configuration(
                "realtime.observer_buffer_size must be greater than zero",
            ));
        }
        if self.gateway.base_url.trim().is_empty() {
            return Err(AppError::configuration("gateway.base_url must be set"));
        }
        Ok(())
    }
}
