//! Coinbase Exchange products. Spot only.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::endpoint::{endpoint, parse_base};
use crate::adapter::outbound::http::FetchClient;
use crate::domain::{ExchangeId, MarketItem};
use crate::error::Result;
use crate::port::MarketFetcher;

pub const DEFAULT_BASE_URL: &str = "https://api.exchange.coinbase.com";

const PRODUCTS_PATH: &str = "/products";

#[derive(Debug, Deserialize)]
struct Product {
    id: String,
    #[serde(default)]
    base_currency: String,
    #[serde(default)]
    quote_currency: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    trading_disabled: bool,
}

pub struct CoinbaseFetcher {
    client: FetchClient,
    base: Url,
}

impl CoinbaseFetcher {
    /// # Errors
    /// Returns an error if the base URL is malformed.
    pub fn new(client: FetchClient, base: &str) -> Result<Self> {
        Ok(Self {
            client,
            base: parse_base(base)?,
        })
    }
}

fn convert(products: Vec<Product>) -> Vec<MarketItem> {
    products
        .into_iter()
        .filter(|p| p.status.eq_ignore_ascii_case("online") && !p.trading_disabled)
        .filter(|p| !p.base_currency.is_empty() && !p.quote_currency.is_empty())
        .map(|p| MarketItem::spot(ExchangeId::COINBASE, p.id, &p.base_currency, &p.quote_currency))
        .collect()
}

#[async_trait]
impl MarketFetcher for CoinbaseFetcher {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::COINBASE
    }

    fn name(&self) -> &'static str {
        "coinbase"
    }

    async fn fetch_spot(&self) -> Result<Vec<MarketItem>> {
        let url = endpoint(&self.base, PRODUCTS_PATH)?;
        let products: Vec<Product> = self.client.get_json(&url, &[]).await?;
        let items = convert(products);
        debug!(exchange = "coinbase", count = items.len(), "Products parsed");
        Ok(items)
    }

    async fn fetch_futures(&self) -> Result<Vec<MarketItem>> {
        Ok(Vec::new())
    }
}
