//! Source indexes and target presence sets.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::{MarketItem, MarketKind, PresenceSet, SourceIndex, SourceInfo};

/// Quote priority when choosing a base's representative spot symbol.
pub const QUOTE_PRIORITY: [&str; 6] = ["USDT", "USDC", "USD", "EUR", "KRW", "BTC"];

fn quote_rank(quote: &str) -> usize {
    QUOTE_PRIORITY
        .iter()
        .position(|q| *q == quote)
        .unwrap_or(QUOTE_PRIORITY.len())
}

/// Index active spot listings by base.
///
/// The representative spot symbol follows [`QUOTE_PRIORITY`]; bases quoted
/// only in other currencies get their lexicographically smallest symbol.
/// The first-seen futures symbol of the base is attached. Futures-only bases
/// are left out.
#[must_use]
pub fn build_source_index(items: &[MarketItem]) -> SourceIndex {
    index_with(items, |_| true)
}

/// Like [`build_source_index`], but only spot listings quoted in `quote` count.
#[must_use]
pub fn build_source_index_for_quote(items: &[MarketItem], quote: &str) -> SourceIndex {
    let quote = quote.trim().to_uppercase();
    index_with(items, |item| item.quote == quote)
}

fn index_with<F>(items: &[MarketItem], accept_spot: F) -> SourceIndex
where
    F: Fn(&MarketItem) -> bool,
{
    let mut best: BTreeMap<&str, (usize, &str)> = BTreeMap::new();
    let mut futures: HashMap<&str, &str> = HashMap::new();

    for item in items.iter().filter(|i| i.active) {
        match item.kind {
            MarketKind::Spot if accept_spot(item) => {
                let candidate = (quote_rank(&item.quote), item.symbol.as_str());
                best.entry(item.base.as_str())
                    .and_modify(|current| {
                        if candidate < *current {
                            *current = candidate;
                        }
                    })
                    .or_insert(candidate);
            }
            MarketKind::Spot => {}
            MarketKind::Futures => {
                if !item.symbol.is_empty() {
                    futures.entry(item.base.as_str()).or_insert(item.symbol.as_str());
                }
            }
        }
    }

    best.into_iter()
        .map(|(base, (_, spot))| {
            (
                base.to_string(),
                SourceInfo {
                    spot: spot.to_string(),
                    futures: futures.get(base).map(|f| (*f).to_string()),
                },
            )
        })
        .collect()
}

/// Bases with an active spot listing quoted in `allowed` and not in `excluded`.
#[must_use]
pub fn build_presence(
    items: &[MarketItem],
    allowed: &HashSet<String>,
    excluded: &HashSet<String>,
) -> PresenceSet {
    items
        .iter()
        .filter(|i| i.active && i.is_spot())
        .filter(|i| allowed.contains(&i.quote) && !excluded.contains(&i.quote))
        .map(|i| i.base.clone())
        .collect()
}

/// What a target exchange lists for one base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetPresence {
    pub has_any_spot: bool,
    pub has_btc: bool,
    pub has_non_btc: bool,
    pub has_futures: bool,
}

/// Per-base listing flags of a target exchange.
#[must_use]
pub fn build_target_presence(items: &[MarketItem]) -> HashMap<String, TargetPresence> {
    let mut out: HashMap<String, TargetPresence> = HashMap::new();
    for item in items.iter().filter(|i| i.active) {
        let entry = out.entry(item.base.clone()).or_default();
        match item.kind {
            MarketKind::Spot => {
                entry.has_any_spot = true;
                if item.quote == "BTC" {
                    entry.has_btc = true;
                } else {
                    entry.has_non_btc = true;
                }
            }
            MarketKind::Futures => entry.has_futures = true,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExchangeId;

    fn spot(symbol: &str, base: &str, quote: &str) -> MarketItem {
        MarketItem::spot(ExchangeId::BINANCE, symbol, base, quote)
    }

    fn fut(symbol: &str, base: &str) -> MarketItem {
        MarketItem::futures(ExchangeId::BINANCE, symbol, base, "USDT")
    }

    fn set(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn usdt_preferred_over_btc() {
        let items = vec![
            spot("AAABTC", "AAA", "BTC"),
            spot("AAAUSDT", "AAA", "USDT"),
            fut("AAAUSDT-PERP", "AAA"),
        ];
        let index = build_source_index(&items);
        assert_eq!(index["AAA"].spot, "AAAUSDT");
        assert_eq!(index["AAA"].futures.as_deref(), Some("AAAUSDT-PERP"));
    }

    #[test]
    fn unranked_quotes_pick_smallest_symbol() {
        let items = vec![spot("XTRY", "X", "TRY"), spot("XBRL", "X", "BRL")];
        assert_eq!(build_source_index(&items)["X"].spot, "XBRL");
    }

    #[test]
    fn futures_only_bases_are_excluded_and_first_future_wins() {
        let items = vec![
            fut("ONLYFUT", "ONLY"),
            spot("BBBUSDT", "BBB", "USDT"),
            fut("BBBUSDT", "BBB"),
            fut("BBBUSDT_250328", "BBB"),
        ];
        let index = build_source_index(&items);
        assert!(!index.contains_key("ONLY"));
        assert_eq!(index["BBB"].futures.as_deref(), Some("BBBUSDT"));
    }

    #[test]
    fn inactive_items_are_ignored() {
        let items = vec![spot("AAAUSDT", "AAA", "USDT").with_active(false)];
        assert!(build_source_index(&items).is_empty());
        assert!(build_presence(&items, &set(&["USDT"]), &set(&[])).is_empty());
    }

    #[test]
    fn quote_restricted_index_drops_other_quotes() {
        let items = vec![
            spot("AAABTC", "AAA", "BTC"),
            spot("BBBUSDT", "BBB", "USDT"),
            fut("AAAUSDT", "AAA"),
        ];
        let index = build_source_index_for_quote(&items, "usdt");
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["BBB"]);
    }

    #[test]
    fn presence_honours_allowed_and_excluded() {
        let items = vec![
            spot("KRW-AAA", "AAA", "KRW"),
            spot("USDT-BBB", "BBB", "USDT"),
            spot("BTC-CCC", "CCC", "BTC"),
        ];
        let presence = build_presence(&items, &set(&["USDT", "USD", "KRW"]), &set(&["USDT", "BTC"]));
        assert_eq!(presence.into_iter().collect::<Vec<_>>(), vec!["AAA".to_string()]);
    }

    #[test]
    fn target_presence_flags() {
        let items = vec![spot("BTC-MOG", "MOG", "BTC"), fut("ETHUSDT", "ETH")];
        let presence = build_target_presence(&items);
        let mog = presence["MOG"];
        assert!(mog.has_any_spot && mog.has_btc && !mog.has_non_btc && !mog.has_futures);
        let eth = presence["ETH"];
        assert!(!eth.has_any_spot && eth.has_futures);
    }
}
