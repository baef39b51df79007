//! Market listings as observed on an exchange.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::ExchangeId;

/// Instrument kind. Part of the persistence identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    Spot,
    Futures,
}

impl MarketKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spot => "spot",
            Self::Futures => "futures",
        }
    }

    #[must_use]
    pub const fn is_futures(self) -> bool {
        matches!(self, Self::Futures)
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spot" => Ok(Self::Spot),
            "futures" => Ok(Self::Futures),
            other => Err(format!("unknown market kind '{other}'")),
        }
    }
}

/// One tradable instrument on one exchange.
///
/// Identity is `(exchange_id, symbol, kind)`. `base` and `quote` are
/// uppercase projections used for grouping only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketItem {
    pub exchange_id: ExchangeId,
    pub kind: MarketKind,
    pub symbol: String,
    pub base: String,
    pub quote: String,
    /// Contract size for futures that expose an integral one.
    pub contract_size: Option<i64>,
    pub active: bool,
}

impl MarketItem {
    /// Create an active spot listing. Base and quote are uppercased.
    pub fn spot(
        exchange_id: ExchangeId,
        symbol: impl Into<String>,
        base: &str,
        quote: &str,
    ) -> Self {
        Self {
            exchange_id,
            kind: MarketKind::Spot,
            symbol: symbol.into(),
            base: base.trim().to_uppercase(),
            quote: quote.trim().to_uppercase(),
            contract_size: None,
            active: true,
        }
    }

    /// Create an active futures listing. Base and quote are uppercased.
    pub fn futures(
        exchange_id: ExchangeId,
        symbol: impl Into<String>,
        base: &str,
        quote: &str,
    ) -> Self {
        Self {
            kind: MarketKind::Futures,
            ..Self::spot(exchange_id, symbol, base, quote)
        }
    }

    #[must_use]
    pub fn with_contract_size(mut self, contract_size: Option<i64>) -> Self {
        self.contract_size = contract_size;
        self
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub const fn is_spot(&self) -> bool {
        matches!(self.kind, MarketKind::Spot)
    }

    /// Persistence identity key.
    #[must_use]
    pub fn identity(&self) -> (ExchangeId, &str, MarketKind) {
        (self.exchange_id, self.symbol.as_str(), self.kind)
    }
}

/// Outcome of one snapshot reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub added: usize,
    pub updated: usize,
    pub archived: usize,
}

impl SyncSummary {
    #[must_use]
    pub const fn new(added: usize, updated: usize, archived: usize) -> Self {
        Self {
            added,
            updated,
            archived,
        }
    }

    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.archived == 0
    }
}

impl std::ops::AddAssign for SyncSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.added += rhs.added;
        self.updated += rhs.updated;
        self.archived += rhs.archived;
    }
}
