//! Endpoint overrides and URL helpers shared by the exchange adapters.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

use crate::error::Result;

/// Optional endpoint overrides for one exchange, e.g. a mirror or a test server.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    /// Separate derivatives host; only Binance uses one.
    #[serde(default)]
    pub futures_url: Option<String>,
}

impl EndpointConfig {
    #[must_use]
    pub fn base_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.base_url.as_deref().unwrap_or(default)
    }

    #[must_use]
    pub fn futures_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.futures_url.as_deref().unwrap_or(default)
    }
}

pub(crate) fn parse_base(raw: &str) -> Result<Url> {
    Ok(Url::parse(raw.trim())?)
}

pub(crate) fn endpoint(base: &Url, path: &str) -> Result<String> {
    Ok(base.join(path)?.to_string())
}

/// Contract size when the exchange reports a positive integral value.
pub(crate) fn integral_size(raw: &str) -> Option<i64> {
    let value = Decimal::from_str(raw.trim()).ok()?;
    if value <= Decimal::ZERO || !value.fract().is_zero() {
        return None;
    }
    value.to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_size_accepts_whole_numbers_only() {
        assert_eq!(integral_size("1"), Some(1));
        assert_eq!(integral_size("100.0"), Some(100));
        assert_eq!(integral_size("0.01"), None);
        assert_eq!(integral_size("0"), None);
        assert_eq!(integral_size(""), None);
        assert_eq!(integral_size("abc"), None);
    }

    #[test]
    fn endpoint_joins_absolute_paths() {
        let base = parse_base("http://127.0.0.1:9000").unwrap();
        assert_eq!(
            endpoint(&base, "/api/v3/exchangeInfo").unwrap(),
            "http://127.0.0.1:9000/api/v3/exchangeInfo"
        );
        assert!(parse_base("not a url").is_err());
    }

    #[test]
    fn endpoint_config_falls_back_to_defaults() {
        let config = EndpointConfig::default();
        assert_eq!(config.base_or("https://a"), "https://a");
        let config = EndpointConfig {
            base_url: Some("http://b".into()),
            futures_url: None,
        };
        assert_eq!(config.base_or("https://a"), "http://b");
        assert_eq!(config.futures_or("https://f"), "https://f");
    }
}
