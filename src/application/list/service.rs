//! Pair-list and segment rebuilds over the persistence ports.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, info};

use super::config::{PresenceConfig, SegmentConfig};
use super::derive::build_list_rows;
use super::presence::{build_presence, build_source_index_for_quote};
use super::segment::{build_segments, TargetSets};
use crate::domain::{
    format_rows, ExchangeId, ListDef, ListId, ListKind, ListMode, MarketItem, PresenceSet,
};
use crate::error::{ConfigError, Error, Result};
use crate::port::{ListDefFilter, ListDefsRepository, ListRepository, MarketRepository};

/// Derives comparison lists from the active market state and stores them.
pub struct ListService {
    markets: Arc<dyn MarketRepository>,
    defs: Arc<dyn ListDefsRepository>,
    lists: Arc<dyn ListRepository>,
    presence: PresenceConfig,
    segments: SegmentConfig,
}

/// Active markets loaded once per exchange for the duration of a rebuild.
struct MarketCache<'a> {
    markets: &'a dyn MarketRepository,
    loaded: HashMap<ExchangeId, Vec<MarketItem>>,
}

impl<'a> MarketCache<'a> {
    fn new(markets: &'a dyn MarketRepository) -> Self {
        Self {
            markets,
            loaded: HashMap::new(),
        }
    }

    async fn get(&mut self, exchange: ExchangeId) -> Result<&[MarketItem]> {
        let items = match self.loaded.entry(exchange) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(self.markets.load_active_by_exchange(exchange).await?)
            }
        };
        Ok(items.as_slice())
    }
}

/// Segment buckets are only written by [`ListService::rebuild_segments`].
fn require_pair(def: ListDef) -> Result<ListDef> {
    if def.kind != ListKind::Pair {
        return Err(ConfigError::InvalidValue {
            field: "list",
            reason: format!("{} is a {} list", def.slug, def.kind.as_str()),
        }
        .into());
    }
    Ok(def)
}

impl ListService {
    pub fn new(
        markets: Arc<dyn MarketRepository>,
        defs: Arc<dyn ListDefsRepository>,
        lists: Arc<dyn ListRepository>,
        presence: PresenceConfig,
        segments: SegmentConfig,
    ) -> Self {
        Self {
            markets,
            defs,
            lists,
            presence,
            segments,
        }
    }

    /// Rebuild one pair list by id. Returns the stored row count.
    pub async fn rebuild_by_id(&self, id: ListId) -> Result<usize> {
        let def = self
            .defs
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::ListNotFound(id.to_string()))?;
        let def = require_pair(def)?;
        let mut cache = MarketCache::new(self.markets.as_ref());
        self.rebuild_def(&def, &mut cache).await
    }

    /// Rebuild one pair list by slug.
    pub async fn rebuild_by_slug(&self, slug: &str) -> Result<usize> {
        let def = self
            .defs
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| Error::ListNotFound(slug.to_string()))?;
        let def = require_pair(def)?;
        let mut cache = MarketCache::new(self.markets.as_ref());
        self.rebuild_def(&def, &mut cache).await
    }

    /// Rebuild every pair list, optionally restricted to a source and/or target slug.
    ///
    /// Returns the stored row count per list slug.
    pub async fn rebuild_filtered(
        &self,
        source: Option<&str>,
        target: Option<&str>,
    ) -> Result<BTreeMap<String, usize>> {
        let filter = ListDefFilter::pairs()
            .with_source(source.map(str::to_ascii_lowercase))
            .with_target(target.map(str::to_ascii_lowercase));
        let defs = self.defs.find(&filter).await?;

        let mut cache = MarketCache::new(self.markets.as_ref());
        let mut counts = BTreeMap::new();
        for def in &defs {
            let count = self.rebuild_def(def, &mut cache).await?;
            counts.insert(def.slug.clone(), count);
        }
        info!(lists = counts.len(), "Pair lists rebuilt");
        Ok(counts)
    }

    async fn rebuild_def(&self, def: &ListDef, cache: &mut MarketCache<'_>) -> Result<usize> {
        let mode = ListMode::for_target(&def.target_slug);
        let source = cache.get(def.source_id).await?.to_vec();
        let target = cache.get(def.target_id).await?;
        let rows = build_list_rows(&source, target, mode);

        let count = self.lists.replace(def.id, rows).await?;
        debug!(list = %def.slug, mode = mode.as_str(), rows = count, "List replaced");
        Ok(count)
    }

    /// Rebuild segment lists for `sources`, or for every configured source when empty.
    ///
    /// All sources are validated before anything is written. Segment slugs
    /// without a seeded definition are skipped. Returns the stored row count
    /// per list slug.
    pub async fn rebuild_segments(&self, sources: &[String]) -> Result<BTreeMap<String, usize>> {
        let requested: Vec<String> = if sources.is_empty() {
            self.segments.sources.clone()
        } else {
            sources.to_vec()
        };
        let resolved = requested
            .iter()
            .map(|s| self.segments.resolve_source(s))
            .collect::<std::result::Result<Vec<_>, ConfigError>>()?;

        let mut cache = MarketCache::new(self.markets.as_ref());
        let [upbit, bithumb, coinbase] = self.segments.targets();
        let upbit = self.target_presence(upbit, &mut cache).await?;
        let bithumb = self.target_presence(bithumb, &mut cache).await?;
        let coinbase = self.target_presence(coinbase, &mut cache).await?;
        let targets = TargetSets {
            upbit: &upbit,
            bithumb: &bithumb,
            coinbase: &coinbase,
        };

        let mut counts = BTreeMap::new();
        for (source, exchange) in resolved {
            let items = cache.get(exchange).await?;
            let index = build_source_index_for_quote(items, &self.segments.source_spot_quote);
            let segments =
                build_segments(&index, targets, self.segments.has_unlisted_bucket(&source))?;

            let buckets: Vec<(String, _)> = segments
                .buckets()
                .into_iter()
                .map(|(segment, rows)| (segment.slug(&source), rows.to_vec()))
                .collect();
            let slugs: Vec<String> = buckets.iter().map(|(slug, _)| slug.clone()).collect();
            let ids: HashMap<String, ListId> =
                self.defs.ids_by_slugs(&slugs).await?.into_iter().collect();

            for (slug, rows) in buckets {
                let Some(id) = ids.get(&slug) else {
                    debug!(list = %slug, "No seeded definition, skipping segment");
                    continue;
                };
                let count = self.lists.replace(*id, rows).await?;
                counts.insert(slug, count);
            }
            info!(source = %source, bases = index.len(), "Segments rebuilt");
        }
        Ok(counts)
    }

    async fn target_presence(&self, slug: &str, cache: &mut MarketCache<'_>) -> Result<PresenceSet> {
        let exchange = ExchangeId::from_slug(slug)
            .ok_or_else(|| ConfigError::UnknownExchange(slug.to_string()))?;
        let (allowed, excluded) = self.presence.quotes_for(slug);
        let items = cache.get(exchange).await?;
        Ok(build_presence(items, &allowed, &excluded))
    }

    /// Stored rows of a list as `SPOT, FUTURES|none` lines.
    pub async fn rows_text(&self, slug: &str) -> Result<String> {
        let rows = self.lists.rows_by_slug(slug).await?;
        Ok(format_rows(&rows))
    }
}
