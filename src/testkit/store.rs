//! In-memory repositories with the same observable semantics as SQLite.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::domain::seeded_defs;
use crate::domain::{ExchangeId, ListDef, ListId, ListRow, MarketItem, MarketKind, SyncSummary};
use crate::error::{Error, Result};
use crate::port::{ListDefFilter, ListDefsRepository, ListRepository, MarketRepository};

type MarketKey = (ExchangeId, MarketKind, String);

/// Market state keyed by identity.
#[derive(Default)]
pub struct InMemoryMarketStore {
    rows: Mutex<BTreeMap<MarketKey, MarketItem>>,
    failing: Mutex<HashSet<ExchangeId>>,
    failing_loads: Mutex<HashSet<ExchangeId>>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows directly, bypassing reconciliation.
    pub fn seed(&self, items: Vec<MarketItem>) {
        let mut rows = self.rows.lock();
        for item in items {
            rows.insert((item.exchange_id, item.kind, item.symbol.clone()), item);
        }
    }

    /// Make every `sync_snapshot` for `exchange` fail.
    pub fn fail_sync_for(&self, exchange: ExchangeId) {
        self.failing.lock().insert(exchange);
    }

    /// Make every `load_active_by_exchange` for `exchange` fail.
    pub fn fail_loads_for(&self, exchange: ExchangeId) {
        self.failing_loads.lock().insert(exchange);
    }

    /// Active rows of `exchange`, ordered by kind then symbol.
    pub fn active(&self, exchange: ExchangeId) -> Vec<MarketItem> {
        self.rows
            .lock()
            .iter()
            .filter(|((id, _, _), item)| *id == exchange && item.active)
            .map(|(_, item)| item.clone())
            .collect()
    }
}

#[async_trait]
impl MarketRepository for InMemoryMarketStore {
    async fn sync_snapshot(
        &self,
        exchange: ExchangeId,
        items: Vec<MarketItem>,
    ) -> Result<SyncSummary> {
        if self.failing.lock().contains(&exchange) {
            return Err(Error::Database("injected failure".to_string()));
        }

        let mut staged: BTreeMap<MarketKey, MarketItem> = BTreeMap::new();
        for mut item in items {
            item.exchange_id = exchange;
            item.active = true;
            staged.insert((exchange, item.kind, item.symbol.clone()), item);
        }

        let mut rows = self.rows.lock();
        let mut summary = SyncSummary::default();
        for (key, item) in &staged {
            match rows.get_mut(key) {
                Some(existing) => {
                    let changed = !existing.active
                        || existing.base != item.base
                        || existing.quote != item.quote
                        || existing.contract_size != item.contract_size;
                    if changed {
                        *existing = item.clone();
                        summary.updated += 1;
                    }
                }
                None => {
                    rows.insert(key.clone(), item.clone());
                    summary.added += 1;
                }
            }
        }
        for (key, item) in rows.iter_mut() {
            if key.0 == exchange && item.active && !staged.contains_key(key) {
                item.active = false;
                summary.archived += 1;
            }
        }
        Ok(summary)
    }

    async fn load_active_by_exchange(&self, exchange: ExchangeId) -> Result<Vec<MarketItem>> {
        if self.failing_loads.lock().contains(&exchange) {
            return Err(Error::Database("injected failure".to_string()));
        }
        Ok(self.active(exchange))
    }
}

/// List definitions and contents.
pub struct InMemoryListStore {
    defs: Vec<ListDef>,
    rows: Mutex<HashMap<ListId, Vec<ListRow>>>,
    replace_calls: AtomicUsize,
}

impl InMemoryListStore {
    pub fn new(defs: Vec<ListDef>) -> Self {
        Self {
            defs,
            rows: Mutex::new(HashMap::new()),
            replace_calls: AtomicUsize::new(0),
        }
    }

    /// Store holding the definitions the migrations seed.
    pub fn with_default_defs() -> Self {
        Self::new(seeded_defs())
    }

    /// Number of `replace` calls that reached the store.
    pub fn replace_calls(&self) -> usize {
        self.replace_calls.load(Ordering::SeqCst)
    }

    fn def_by_slug(&self, slug: &str) -> Option<&ListDef> {
        self.defs.iter().find(|d| d.slug == slug)
    }
}

#[async_trait]
impl ListDefsRepository for InMemoryListStore {
    async fn find(&self, filter: &ListDefFilter) -> Result<Vec<ListDef>> {
        let mut defs: Vec<ListDef> = self
            .defs
            .iter()
            .filter(|d| filter.kind.map_or(true, |k| d.kind == k))
            .filter(|d| filter.source_slug.as_ref().map_or(true, |s| &d.source_slug == s))
            .filter(|d| filter.target_slug.as_ref().map_or(true, |t| &d.target_slug == t))
            .cloned()
            .collect();
        defs.sort_by_key(|d| d.id);
        Ok(defs)
    }

    async fn get_by_id(&self, id: ListId) -> Result<Option<ListDef>> {
        Ok(self.defs.iter().find(|d| d.id == id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<ListDef>> {
        Ok(self.def_by_slug(slug).cloned())
    }

    async fn ids_by_slugs(&self, slugs: &[String]) -> Result<Vec<(String, ListId)>> {
        Ok(self
            .defs
            .iter()
            .filter(|d| slugs.contains(&d.slug))
            .map(|d| (d.slug.clone(), d.id))
            .collect())
    }
}

#[async_trait]
impl ListRepository for InMemoryListStore {
    async fn replace(&self, list_id: ListId, rows: Vec<ListRow>) -> Result<usize> {
        if !self.defs.iter().any(|d| d.id == list_id) {
            return Err(Error::ListNotFound(list_id.to_string()));
        }
        self.replace_calls.fetch_add(1, Ordering::SeqCst);

        let mut seen = HashSet::new();
        let mut unique: Vec<ListRow> = rows
            .into_iter()
            .filter(|r| seen.insert(r.spot.clone()))
            .collect();
        unique.sort_by(|a, b| a.spot.cmp(&b.spot));
        let count = unique.len();
        self.rows.lock().insert(list_id, unique);
        Ok(count)
    }

    async fn replace_by_slug(&self, slug: &str, rows: Vec<ListRow>) -> Result<usize> {
        let id = self
            .def_by_slug(slug)
            .map(|d| d.id)
            .ok_or_else(|| Error::ListNotFound(slug.to_string()))?;
        self.replace(id, rows).await
    }

    async fn rows_by_slug(&self, slug: &str) -> Result<Vec<ListRow>> {
        let id = self
            .def_by_slug(slug)
            .map(|d| d.id)
            .ok_or_else(|| Error::ListNotFound(slug.to_string()))?;
        Ok(self.rows.lock().get(&id).cloned().unwrap_or_default())
    }
}
