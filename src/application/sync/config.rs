//! Orchestrator settings.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::ExchangeId;
use crate::error::ConfigError;

/// Which exchanges are synced and how long each may take.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    /// Upper bound for one exchange's fetch and reconcile.
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
    /// Enabled exchange slugs.
    #[serde(default = "default_exchanges")]
    pub exchanges: Vec<String>,
}

const fn default_task_timeout_secs() -> u64 {
    45
}

fn default_exchanges() -> Vec<String> {
    ["binance", "bybit", "okx", "coinbase", "upbit", "bithumb"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            task_timeout_secs: default_task_timeout_secs(),
            exchanges: default_exchanges(),
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub const fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.task_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.task_timeout_secs",
                reason: "must be greater than 0".to_string(),
            });
        }
        let mut seen = BTreeSet::new();
        for slug in &self.exchanges {
            let id = ExchangeId::from_slug(slug)
                .ok_or_else(|| ConfigError::UnknownExchange(slug.clone()))?;
            if !seen.insert(id) {
                return Err(ConfigError::InvalidValue {
                    field: "sync.exchanges",
                    reason: format!("'{slug}' is listed more than once"),
                });
            }
        }
        Ok(())
    }
}
