//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Exchange identifier - small integer newtype matching the `exchanges` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExchangeId(i16);

impl ExchangeId {
    pub const BINANCE: Self = Self(1);
    pub const BYBIT: Self = Self(2);
    pub const OKX: Self = Self(3);
    pub const COINBASE: Self = Self(4);
    pub const UPBIT: Self = Self(5);
    pub const BITHUMB: Self = Self(6);
    pub const ROBINHOOD: Self = Self(7);

    /// Create a new `ExchangeId` from its numeric value.
    #[must_use]
    pub const fn new(id: i16) -> Self {
        Self(id)
    }

    /// Get the numeric value.
    #[must_use]
    pub const fn get(self) -> i16 {
        self.0
    }

    /// Resolve a well-known exchange slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "binance" => Some(Self::BINANCE),
            "bybit" => Some(Self::BYBIT),
            "okx" => Some(Self::OKX),
            "coinbase" => Some(Self::COINBASE),
            "upbit" => Some(Self::UPBIT),
            "bithumb" => Some(Self::BITHUMB),
            "robinhood" => Some(Self::ROBINHOOD),
            _ => None,
        }
    }

    /// Slug for well-known exchanges, `None` for anything else.
    #[must_use]
    pub const fn slug(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("binance"),
            2 => Some("bybit"),
            3 => Some("okx"),
            4 => Some("coinbase"),
            5 => Some("upbit"),
            6 => Some("bithumb"),
            7 => Some("robinhood"),
            _ => None,
        }
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i16> for ExchangeId {
    fn from(id: i16) -> Self {
        Self::new(id)
    }
}

/// List definition identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListId(i32);

impl ListId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ListId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_round_trips_for_known_exchanges() {
        for id in 1..=7 {
            let id = ExchangeId::new(id);
            let slug = id.slug().unwrap();
            assert_eq!(ExchangeId::from_slug(slug), Some(id));
        }
    }

    #[test]
    fn from_slug_is_case_insensitive_and_trims() {
        assert_eq!(ExchangeId::from_slug(" Upbit "), Some(ExchangeId::UPBIT));
        assert_eq!(ExchangeId::from_slug("kraken"), None);
        assert_eq!(ExchangeId::new(42).slug(), None);
    }
}
