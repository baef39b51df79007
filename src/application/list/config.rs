//! Quote rules and segment settings.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::domain::ExchangeId;
use crate::error::ConfigError;

/// Quote override for one target exchange.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct QuoteRule {
    /// Replaces the default allowed quotes when set.
    #[serde(default)]
    pub allowed: Option<Vec<String>>,
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// Which spot quotes count as presence on a target exchange.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PresenceConfig {
    #[serde(default = "default_allowed_quotes")]
    pub allowed: Vec<String>,
    /// Per-target overrides; targets without one use the built-in rule.
    #[serde(default)]
    pub targets: BTreeMap<String, QuoteRule>,
}

fn default_allowed_quotes() -> Vec<String> {
    vec!["USDT".into(), "USD".into(), "KRW".into()]
}

/// Korean exchanges only count KRW-side listings by default.
fn builtin_rule(target: &str) -> QuoteRule {
    match target {
        "upbit" | "bithumb" => QuoteRule {
            allowed: None,
            excluded: vec!["USDT".into(), "BTC".into()],
        },
        _ => QuoteRule::default(),
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            allowed: default_allowed_quotes(),
            targets: BTreeMap::new(),
        }
    }
}

fn upper_set(values: &[String]) -> HashSet<String> {
    values.iter().map(|v| v.trim().to_uppercase()).collect()
}

impl PresenceConfig {
    /// Allowed and excluded quotes for `target`, uppercased.
    #[must_use]
    pub fn quotes_for(&self, target: &str) -> (HashSet<String>, HashSet<String>) {
        let key = target.trim().to_ascii_lowercase();
        let rule = self
            .targets
            .get(&key)
            .cloned()
            .unwrap_or_else(|| builtin_rule(&key));
        let allowed = rule.allowed.as_deref().unwrap_or(&self.allowed);
        (upper_set(allowed), upper_set(&rule.excluded))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed.iter().all(|q| q.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "presence.allowed",
                reason: "at least one quote is required".to_string(),
            });
        }
        for slug in self.targets.keys() {
            if ExchangeId::from_slug(slug).is_none() {
                return Err(ConfigError::UnknownExchange(slug.clone()));
            }
        }
        Ok(())
    }
}

/// Segment sources and the three classification targets.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SegmentConfig {
    #[serde(default = "default_segment_sources")]
    pub sources: Vec<String>,
    #[serde(default = "default_upbit")]
    pub upbit: String,
    #[serde(default = "default_bithumb")]
    pub bithumb: String,
    #[serde(default = "default_coinbase")]
    pub coinbase: String,
    /// Only source spot listings in this quote are classified.
    #[serde(default = "default_source_spot_quote")]
    pub source_spot_quote: String,
    /// Sources that also get a seg0 bucket (listed on none of the targets).
    #[serde(default = "default_unlisted_bucket")]
    pub unlisted_bucket: Vec<String>,
}

fn default_segment_sources() -> Vec<String> {
    vec!["binance".into(), "bybit".into(), "okx".into()]
}

fn default_upbit() -> String {
    "upbit".into()
}

fn default_bithumb() -> String {
    "bithumb".into()
}

fn default_coinbase() -> String {
    "coinbase".into()
}

fn default_source_spot_quote() -> String {
    "USDT".into()
}

fn default_unlisted_bucket() -> Vec<String> {
    vec!["binance".into()]
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            sources: default_segment_sources(),
            upbit: default_upbit(),
            bithumb: default_bithumb(),
            coinbase: default_coinbase(),
            source_spot_quote: default_source_spot_quote(),
            unlisted_bucket: default_unlisted_bucket(),
        }
    }
}

impl SegmentConfig {
    /// Resolve a configured segment source.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownSegmentSource`] for anything not in `sources`.
    pub fn resolve_source(&self, slug: &str) -> Result<(String, ExchangeId), ConfigError> {
        let slug = slug.trim().to_ascii_lowercase();
        let configured = self.sources.iter().any(|s| s.eq_ignore_ascii_case(&slug));
        match ExchangeId::from_slug(&slug) {
            Some(id) if configured => Ok((slug, id)),
            _ => Err(ConfigError::UnknownSegmentSource(slug)),
        }
    }

    #[must_use]
    pub fn has_unlisted_bucket(&self, source: &str) -> bool {
        self.unlisted_bucket
            .iter()
            .any(|s| s.eq_ignore_ascii_case(source))
    }

    /// Target slugs in (upbit, bithumb, coinbase) role order.
    #[must_use]
    pub fn targets(&self) -> [&str; 3] {
        [&self.upbit, &self.bithumb, &self.coinbase]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for source in &self.sources {
            if ExchangeId::from_slug(source).is_none() {
                return Err(ConfigError::UnknownSegmentSource(source.clone()));
            }
        }
        for target in self.targets() {
            if ExchangeId::from_slug(target).is_none() {
                return Err(ConfigError::UnknownExchange(target.to_string()));
            }
        }
        for source in &self.unlisted_bucket {
            self.resolve_source(source)?;
        }
        if self.source_spot_quote.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "segments.source_spot_quote",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn korean_targets_exclude_usdt_and_btc() {
        let config = PresenceConfig::default();
        let (allowed, excluded) = config.quotes_for("Upbit");
        assert!(allowed.contains("KRW") && allowed.contains("USDT"));
        assert!(excluded.contains("USDT") && excluded.contains("BTC"));

        let (_, excluded) = config.quotes_for("coinbase");
        assert!(excluded.is_empty());
    }

    #[test]
    fn override_for_one_target_keeps_builtin_rules_for_others() {
        let mut config = PresenceConfig::default();
        config.targets.insert(
            "coinbase".into(),
            QuoteRule {
                allowed: None,
                excluded: vec!["eur".into()],
            },
        );
        let (_, excluded) = config.quotes_for("coinbase");
        assert_eq!(excluded, HashSet::from(["EUR".to_string()]));
        let (_, excluded) = config.quotes_for("bithumb");
        assert!(excluded.contains("BTC"));
    }

    #[test]
    fn target_rule_can_replace_allowed_quotes() {
        let mut config = PresenceConfig::default();
        config.targets.insert(
            "robinhood".into(),
            QuoteRule {
                allowed: Some(vec!["usd".into()]),
                excluded: vec![],
            },
        );
        let (allowed, _) = config.quotes_for("robinhood");
        assert_eq!(allowed, HashSet::from(["USD".to_string()]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_segment_source_is_rejected() {
        let config = SegmentConfig::default();
        assert!(matches!(
            config.resolve_source("kraken"),
            Err(ConfigError::UnknownSegmentSource(_))
        ));
        assert!(matches!(
            config.resolve_source("upbit"),
            Err(ConfigError::UnknownSegmentSource(_))
        ));
        assert_eq!(config.resolve_source(" OKX ").unwrap().1, ExchangeId::OKX);
    }

    #[test]
    fn unlisted_bucket_defaults_to_binance() {
        let config = SegmentConfig::default();
        assert!(config.has_unlisted_bucket("binance"));
        assert!(!config.has_unlisted_bucket("bybit"));
        assert!(config.validate().is_ok());
    }
}
