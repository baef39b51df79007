//! Builders for domain primitives used across tests.

use crate::domain::{ExchangeId, ListDef, ListId, ListKind, ListRow, MarketItem};

/// Active spot listing.
pub fn spot(exchange: ExchangeId, symbol: &str, base: &str, quote: &str) -> MarketItem {
    MarketItem::spot(exchange, symbol, base, quote)
}

/// Active futures listing.
pub fn futures(exchange: ExchangeId, symbol: &str, base: &str, quote: &str) -> MarketItem {
    MarketItem::futures(exchange, symbol, base, quote)
}

/// List row; `None` futures renders as `none`.
pub fn row(spot: &str, futures: Option<&str>) -> ListRow {
    ListRow::new(spot, futures.map(str::to_string))
}

fn def(id: i32, slug: &str, kind: ListKind, source: &str, target: &str) -> ListDef {
    ListDef {
        id: ListId::new(id),
        slug: slug.to_string(),
        kind,
        source_id: ExchangeId::from_slug(source).unwrap_or(ExchangeId::new(0)),
        source_slug: source.to_string(),
        target_id: ExchangeId::from_slug(target).unwrap_or(ExchangeId::new(0)),
        target_slug: target.to_string(),
    }
}

/// The list definitions seeded by the database migrations.
pub fn seeded_defs() -> Vec<ListDef> {
    let pairs = [
        (1, "binance", "upbit"),
        (2, "binance", "bithumb"),
        (3, "binance", "coinbase"),
        (4, "bybit", "upbit"),
        (5, "bybit", "bithumb"),
        (6, "bybit", "coinbase"),
        (7, "bybit", "binance"),
        (8, "okx", "upbit"),
        (9, "okx", "bithumb"),
        (10, "okx", "coinbase"),
        (11, "okx", "binance"),
    ];
    let mut defs: Vec<ListDef> = pairs
        .iter()
        .map(|(id, source, target)| {
            def(*id, &format!("{source}_to_{target}"), ListKind::Pair, source, target)
        })
        .collect();

    let segments = [("binance", 101, 0..=4), ("bybit", 111, 1..=4), ("okx", 121, 1..=4)];
    for (source, first_id, range) in segments {
        let first = *range.start();
        for n in range {
            let id = first_id + n - first;
            defs.push(def(id, &format!("{source}_seg{n}"), ListKind::Segment, source, "upbit"));
        }
    }
    defs
}
