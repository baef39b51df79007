//! Two-exchange inclusion lists.

use crate::domain::{ListMode, ListRow, MarketItem};

use super::presence::{build_source_index, build_target_presence, TargetPresence};

/// Whether `mode` drops a base given what the target lists for it.
#[must_use]
pub const fn excluded_by(mode: ListMode, presence: TargetPresence) -> bool {
    match mode {
        ListMode::Upbit | ListMode::Bithumb => presence.has_non_btc,
        ListMode::Binance => presence.has_any_spot && !presence.has_futures,
        ListMode::Coinbase | ListMode::Other => presence.has_any_spot,
    }
}

/// Source bases the target does not list under `mode`, sorted by spot symbol.
#[must_use]
pub fn build_list_rows(source: &[MarketItem], target: &[MarketItem], mode: ListMode) -> Vec<ListRow> {
    let index = build_source_index(source);
    let presence = build_target_presence(target);

    let mut rows: Vec<ListRow> = index
        .into_iter()
        .filter(|(base, _)| {
            let seen = presence.get(base).copied().unwrap_or_default();
            !excluded_by(mode, seen)
        })
        .map(|(_, info)| ListRow::new(info.spot, info.futures))
        .collect();
    rows.sort_by(|a, b| a.spot.cmp(&b.spot));
    rows
}
