//! Exchange port for market listings.

use async_trait::async_trait;

use crate::domain::{ExchangeId, MarketItem};
use crate::error::Result;

/// Fetches the current listing snapshot of one exchange.
///
/// Implementations normalize exchange payloads into [`MarketItem`] values.
/// Exchanges without derivatives return an empty futures list, not an error.
#[async_trait]
pub trait MarketFetcher: Send + Sync {
    /// Stable numeric exchange id.
    fn exchange_id(&self) -> ExchangeId;

    /// Exchange slug used in logs and reports.
    fn name(&self) -> &'static str;

    /// Fetch active spot listings.
    async fn fetch_spot(&self) -> Result<Vec<MarketItem>>;

    /// Fetch active futures listings.
    async fn fetch_futures(&self) -> Result<Vec<MarketItem>>;
}
