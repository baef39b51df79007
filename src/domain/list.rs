//! Comparison list definitions and rows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::{ExchangeId, ListId};
use crate::error::ConfigError;

/// Textual stand-in for a missing futures symbol.
pub const NONE_SENTINEL: &str = "none";

/// Whether a list is a direct source→target comparison or a segment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Pair,
    Segment,
}

impl ListKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pair => "pair",
            Self::Segment => "segment",
        }
    }
}

impl FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pair" => Ok(Self::Pair),
            "segment" => Ok(Self::Segment),
            other => Err(format!("unknown list kind '{other}'")),
        }
    }
}

/// A named, directed list definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListDef {
    pub id: ListId,
    pub slug: String,
    pub kind: ListKind,
    pub source_id: ExchangeId,
    pub source_slug: String,
    pub target_id: ExchangeId,
    pub target_slug: String,
}

/// One output row of a list: the chosen spot symbol and optional futures symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListRow {
    pub spot: String,
    pub futures: Option<String>,
}

impl ListRow {
    pub fn new(spot: impl Into<String>, futures: Option<String>) -> Self {
        Self {
            spot: spot.into(),
            futures: futures.filter(|f| !f.is_empty() && f != NONE_SENTINEL),
        }
    }

    /// Futures symbol or the `none` sentinel.
    #[must_use]
    pub fn futures_or_none(&self) -> &str {
        self.futures.as_deref().unwrap_or(NONE_SENTINEL)
    }
}

impl fmt::Display for ListRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.spot, self.futures_or_none())
    }
}

/// Render rows as `SPOT, FUTURES` lines with a trailing newline.
#[must_use]
pub fn format_rows(rows: &[ListRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&row.to_string());
        out.push('\n');
    }
    out
}

/// Exclusion policy used when building a two-exchange list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListMode {
    /// Excluded only when the target lists the base against a non-BTC quote.
    Upbit,
    /// Same policy as [`ListMode::Upbit`].
    Bithumb,
    /// Excluded on any spot presence.
    Coinbase,
    /// Excluded when the target has spot but no futures for the base.
    Binance,
    /// Any other target; behaves like [`ListMode::Coinbase`].
    Other,
}

impl ListMode {
    /// Mode implied by a target exchange slug. Unknown targets get [`ListMode::Other`].
    #[must_use]
    pub fn for_target(target_slug: &str) -> Self {
        target_slug.parse().unwrap_or(Self::Other)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upbit => "upbit",
            Self::Bithumb => "bithumb",
            Self::Coinbase => "coinbase",
            Self::Binance => "binance",
            Self::Other => "other",
        }
    }
}

impl FromStr for ListMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upbit" => Ok(Self::Upbit),
            "bithumb" => Ok(Self::Bithumb),
            "coinbase" => Ok(Self::Coinbase),
            "binance" => Ok(Self::Binance),
            "other" => Ok(Self::Other),
            _ => Err(ConfigError::UnknownListMode(s.to_string())),
        }
    }
}
