//! Command-line arguments.

use clap::{ArgAction, Parser};

use publy_core::config::AppConfig;
use publy_core::error::AppError;

/// Default configuration file, read only if present.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Publy, an ephemeral WebSocket pub/sub relay
///
/// `-h` selects the bind host, so help is only available as `--help`.
#[derive(Debug, Parser)]
#[command(name = "publy", version, about, long_about = None, disable_help_flag = true)]
pub struct Cli {
    /// Host to bind
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log filter, e.g. `info` or `publy_realtime=debug`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Cli {
    /// Loads configuration and applies command-line overrides.
    ///
    /// An explicit `--config` must exist; the default path is optional.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        let (path, required) = match &self.config {
            Some(path) => (path.as_str(), true),
            None => (DEFAULT_CONFIG_PATH, false),
        };

        let mut config = AppConfig::load(path, required)?;
        self.apply(&mut config);
        Ok(config)
    }

    /// Overlays flags onto `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
    }
}
