//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! an optional TOML file overlaid with `PUBLY__` environment variables.
//! Every field carries a default, so a missing file yields a working relay.

pub mod app;
pub mod logging;
pub mod relay;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::logging::LoggingConfig;
pub use self::relay::{ChannelNamePolicy, DeliveryMode, RelayConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Relay engine settings (delivery policy, sinks, sessions).
    #[serde(default)]
    pub relay: RelayConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file plus environment overrides.
    ///
    /// When `required` is false a missing file is not an error and the
    /// defaults apply. Environment variables use the `PUBLY__` prefix and a
    /// `__` separator, e.g. `PUBLY__SERVER__PORT=9000`.
    pub fn load(path: &str, required: bool) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(required))
            .add_source(
                config::Environment::with_prefix("PUBLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let parsed: Self = config.try_deserialize()?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Rejects settings the relay cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.relay.sink_capacity == 0 {
            return Err(AppError::configuration(
                "relay.sink_capacity must be at least 1",
            ));
        }
        if self.relay.channel_names.min_length == 0 {
            return Err(AppError::configuration(
                "relay.channel_names.min_length must be at least 1",
            ));
        }
        Ok(())
    }
}
