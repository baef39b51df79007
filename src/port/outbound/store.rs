//! Persistence ports for markets and lists.

use async_trait::async_trait;

use crate::domain::{ExchangeId, ListDef, ListId, ListKind, ListRow, MarketItem, SyncSummary};
use crate::error::Result;

/// Active/archived market state per exchange.
#[async_trait]
pub trait MarketRepository: Send + Sync {
    /// Reconcile `items` as the complete snapshot of `exchange`.
    ///
    /// Runs atomically: afterwards the exchange's active set equals the
    /// snapshot. Concurrent calls for the same exchange are serialized.
    async fn sync_snapshot(&self, exchange: ExchangeId, items: Vec<MarketItem>)
        -> Result<SyncSummary>;

    /// Active rows of `exchange`, ordered by kind then symbol.
    async fn load_active_by_exchange(&self, exchange: ExchangeId) -> Result<Vec<MarketItem>>;
}

/// Optional filters for [`ListDefsRepository::find`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDefFilter {
    pub source_slug: Option<String>,
    pub target_slug: Option<String>,
    pub kind: Option<ListKind>,
}

impl ListDefFilter {
    #[must_use]
    pub fn pairs() -> Self {
        Self {
            kind: Some(ListKind::Pair),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_source(mut self, slug: Option<String>) -> Self {
        self.source_slug = slug;
        self
    }

    #[must_use]
    pub fn with_target(mut self, slug: Option<String>) -> Self {
        self.target_slug = slug;
        self
    }
}

/// Lookup of list definitions.
#[async_trait]
pub trait ListDefsRepository: Send + Sync {
    /// Definitions matching `filter`, ordered by id.
    async fn find(&self, filter: &ListDefFilter) -> Result<Vec<ListDef>>;

    async fn get_by_id(&self, id: ListId) -> Result<Option<ListDef>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<ListDef>>;

    /// Resolve slugs to ids. Unknown slugs are absent from the result.
    async fn ids_by_slugs(&self, slugs: &[String]) -> Result<Vec<(String, ListId)>>;
}

/// Stored list contents.
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Replace the contents of `list_id` wholesale. Returns the stored row count.
    async fn replace(&self, list_id: ListId, rows: Vec<ListRow>) -> Result<usize>;

    async fn replace_by_slug(&self, slug: &str, rows: Vec<ListRow>) -> Result<usize>;

    /// Stored rows of a list, ordered by spot symbol.
    async fn rows_by_slug(&self, slug: &str) -> Result<Vec<ListRow>>;
}
