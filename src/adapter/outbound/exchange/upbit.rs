//! Upbit markets. Spot only; symbols are `QUOTE-BASE`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::endpoint::{endpoint, parse_base};
use crate::adapter::outbound::http::FetchClient;
use crate::domain::symbol::{split, SymbolStyle};
use crate::domain::{ExchangeId, MarketItem};
use crate::error::Result;
use crate::port::MarketFetcher;

pub const DEFAULT_BASE_URL: &str = "https://api.upbit.com";

const MARKETS_PATH: &str = "/v1/market/all";

#[derive(Debug, Deserialize)]
struct Market {
    market: String,
}

pub struct UpbitFetcher {
    client: FetchClient,
    base: Url,
}

impl UpbitFetcher {
    /// # Errors
    /// Returns an error if the base URL is malformed.
    pub fn new(client: FetchClient, base: &str) -> Result<Self> {
        Ok(Self {
            client,
            base: parse_base(base)?,
        })
    }
}

fn convert(markets: Vec<Market>) -> Vec<MarketItem> {
    markets
        .into_iter()
        .filter_map(|m| {
            let (base, quote) = split(&m.market, SymbolStyle::QuoteBase)?;
            Some(MarketItem::spot(ExchangeId::UPBIT, m.market, &base, &quote))
        })
        .collect()
}

#[async_trait]
impl MarketFetcher for UpbitFetcher {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::UPBIT
    }

    fn name(&self) -> &'static str {
        "upbit"
    }

    async fn fetch_spot(&self) -> Result<Vec<MarketItem>> {
        let url = endpoint(&self.base, MARKETS_PATH)?;
        let markets: Vec<Market> = self
            .client
            .get_json(&url, &[("isDetails", "false")])
            .await?;
        let items = convert(markets);
        debug!(exchange = "upbit", count = items.len(), "Markets parsed");
        Ok(items)
    }

    async fn fetch_futures(&self) -> Result<Vec<MarketItem>> {
        Ok(Vec::new())
    }
}
