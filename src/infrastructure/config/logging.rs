//! Logging configuration and initialization.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// `pretty`, `compact` or `json`.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".into()
}

fn default_format() -> String {
    "pretty".into()
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// `RUST_LOG` takes precedence over the configured level. Logs go to
    /// stderr so command output on stdout stays clean.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            "compact" => {
                fmt()
                    .compact()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            _ => {
                fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.format.as_str() {
            "pretty" | "compact" | "json" => Ok(()),
            other => Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected pretty, compact or json, got '{other}'"),
            }),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}
