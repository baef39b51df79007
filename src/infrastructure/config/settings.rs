//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; every section is optional and
//! falls back to its defaults. HTTP settings can be overridden from the
//! environment (`HTTP_TIMEOUT_MS`, `HTTP_RETRIES`, `HTTP_USER_AGENT`).
//!
//! # Example
//!
//! ```no_run
//! use listwatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("listwatch.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::logging::LoggingConfig;
use crate::adapter::outbound::exchange::EndpointConfig;
use crate::adapter::outbound::http::HttpConfig;
use crate::application::list::{PresenceConfig, SegmentConfig};
use crate::application::scheduler::SchedulerConfig;
use crate::application::sync::SyncConfig;
use crate::domain::ExchangeId;
use crate::error::{ConfigError, Result};

/// Config file used when no path is given and it exists.
pub const DEFAULT_CONFIG_PATH: &str = "listwatch.toml";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to SQLite database file.
    ///
    /// Defaults to "listwatch.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Maximum pooled database connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Fetch client timeouts and retries.
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Quote rules for target presence sets.
    #[serde(default)]
    pub presence: PresenceConfig,

    #[serde(default)]
    pub segments: SegmentConfig,

    /// Per-exchange endpoint overrides keyed by slug.
    #[serde(default)]
    pub exchanges: BTreeMap<String, EndpointConfig>,
}

fn default_database_path() -> String {
    "listwatch.db".to_string()
}

const fn default_pool_size() -> u32 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            pool_size: default_pool_size(),
            logging: LoggingConfig::default(),
            http: HttpConfig::default(),
            sync: SyncConfig::default(),
            scheduler: SchedulerConfig::default(),
            presence: PresenceConfig::default(),
            segments: SegmentConfig::default(),
            exchanges: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content with process environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed, an override is not
    /// a valid value, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with_env(content, |key| std::env::var(key).ok())
    }

    /// Parse configuration from TOML content, reading overrides through `lookup`.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml_with_env<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.http.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the content is malformed
    /// or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path`, or [`DEFAULT_CONFIG_PATH`] when present, or defaults.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => Self::parse_toml(""),
        }
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        if self.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pool_size",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        self.logging.validate()?;
        self.http.validate()?;
        self.sync.validate()?;
        self.scheduler.validate()?;
        self.presence.validate()?;
        self.segments.validate()?;
        for slug in self.exchanges.keys() {
            if ExchangeId::from_slug(slug).is_none() {
                return Err(ConfigError::UnknownExchange(slug.clone()).into());
            }
        }
        Ok(())
    }

    /// Diesel connection URL of the configured database.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!("sqlite://{}", self.database)
    }

    /// Endpoint overrides for `slug`, empty when none are configured.
    #[must_use]
    pub fn endpoint(&self, slug: &str) -> EndpointConfig {
        self.exchanges.get(slug).cloned().unwrap_or_default()
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml_with_env("", no_env).unwrap();
        assert_eq!(config.database, "listwatch.db");
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(config.sync.task_timeout_secs, 45);
        assert_eq!(config.scheduler.interval_secs, 600);
        assert_eq!(config.segments.sources, vec!["binance", "bybit", "okx"]);
        assert_eq!(config.database_url(), "sqlite://listwatch.db");
    }

    #[test]
    fn sections_override_defaults() {
        let toml = r#"
            database = "/tmp/lw.db"

            [logging]
            level = "debug"
            format = "json"

            [http]
            timeout_ms = 2000
            retries = 4

            [sync]
            exchanges = ["binance", "upbit"]

            [presence.targets.coinbase]
            excluded = ["EUR"]

            [segments]
            unlisted_bucket = ["binance", "okx"]

            [exchanges.binance]
            base_url = "http://127.0.0.1:9000"
        "#;
        let config = Config::parse_toml_with_env(toml, no_env).unwrap();
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.http.timeout_ms, 2000);
        assert_eq!(config.http.retries, 4);
        assert_eq!(config.http.backoff_min_ms, 200);
        assert_eq!(config.sync.exchanges, vec!["binance", "upbit"]);
        assert!(config.segments.has_unlisted_bucket("okx"));
        assert_eq!(
            config.endpoint("binance").base_url.as_deref(),
            Some("http://127.0.0.1:9000")
        );
        assert_eq!(config.endpoint("okx"), EndpointConfig::default());

        let (_, excluded) = config.presence.quotes_for("coinbase");
        assert!(excluded.contains("EUR"));
    }

    #[test]
    fn env_overrides_http_settings() {
        let config = Config::parse_toml_with_env("[http]\ntimeout_ms = 2000\n", |key| match key {
            "HTTP_TIMEOUT_MS" => Some("1500".to_string()),
            "HTTP_USER_AGENT" => Some("mirror-bot".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.http.timeout_ms, 1500);
        assert_eq!(config.http.user_agent, "mirror-bot");
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = Config::parse_toml_with_env("database = ", no_env).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn unknown_segment_source_fails_validation() {
        let err = Config::parse_toml_with_env("[segments]\nsources = [\"kraken\"]\n", no_env)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::UnknownSegmentSource(_))
        ));
    }

    #[test]
    fn unknown_endpoint_slug_fails_validation() {
        let err = Config::parse_toml_with_env("[exchanges.kraken]\nbase_url = \"http://x\"\n", no_env)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::UnknownExchange(_))
        ));
    }

    #[test]
    fn bad_log_format_is_rejected() {
        assert!(Config::parse_toml_with_env("[logging]\nformat = \"xml\"\n", no_env).is_err());
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        assert!(Config::parse_toml_with_env("pool_size = 0\n", no_env).is_err());
    }
}
