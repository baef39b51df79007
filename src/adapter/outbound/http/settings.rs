//! Fetch client settings.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// HTTP settings shared by every exchange adapter.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries after the first attempt.
    #[serde(default = "default_http_retries")]
    pub retries: u32,
    /// Backoff for the first retry in milliseconds.
    #[serde(default = "default_http_backoff_min_ms")]
    pub backoff_min_ms: u64,
    /// Upper bound of the computed backoff in milliseconds.
    #[serde(default = "default_http_backoff_max_ms")]
    pub backoff_max_ms: u64,
    #[serde(default = "default_http_user_agent")]
    pub user_agent: String,
}

const fn default_http_timeout_ms() -> u64 {
    8000
}

const fn default_http_retries() -> u32 {
    2
}

const fn default_http_backoff_min_ms() -> u64 {
    200
}

const fn default_http_backoff_max_ms() -> u64 {
    3000
}

fn default_http_user_agent() -> String {
    concat!("listwatch/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            retries: default_http_retries(),
            backoff_min_ms: default_http_backoff_min_ms(),
            backoff_max_ms: default_http_backoff_max_ms(),
            user_agent: default_http_user_agent(),
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub const fn backoff_min(&self) -> Duration {
        Duration::from_millis(self.backoff_min_ms)
    }

    #[must_use]
    pub const fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    /// Apply `HTTP_TIMEOUT_MS`, `HTTP_RETRIES` and `HTTP_USER_AGENT` overrides.
    ///
    /// `lookup` resolves a variable name; pass `|k| std::env::var(k).ok()` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("HTTP_TIMEOUT_MS") {
            self.timeout_ms = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "HTTP_TIMEOUT_MS",
                reason: format!("'{raw}' is not a number of milliseconds"),
            })?;
        }
        if let Some(raw) = lookup("HTTP_RETRIES") {
            self.retries = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "HTTP_RETRIES",
                reason: format!("'{raw}' is not a retry count"),
            })?;
        }
        if let Some(agent) = lookup("HTTP_USER_AGENT") {
            if !agent.trim().is_empty() {
                self.user_agent = agent.trim().to_string();
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.backoff_max_ms < self.backoff_min_ms {
            return Err(ConfigError::InvalidValue {
                field: "http.backoff_max_ms",
                reason: "must be >= backoff_min_ms".to_string(),
            });
        }
        Ok(())
    }
}
