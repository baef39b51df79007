//! Bithumb KRW and USDT ticker maps. Spot only.
//!
//! The public ticker endpoints return `{"status":"0000","data":{"BTC":{..},"date":"..."}}`;
//! every object-valued key except `date` is a listed base.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use super::endpoint::{endpoint, parse_base};
use crate::adapter::outbound::http::FetchClient;
use crate::domain::{ExchangeId, MarketItem};
use crate::error::{FetchError, Result};
use crate::port::MarketFetcher;

pub const DEFAULT_BASE_URL: &str = "https://api.bithumb.com";

/// Ticker endpoints and the quote each one lists against.
const BOOKS: [(&str, &str); 2] = [("/public/ticker/ALL", "KRW"), ("/public/ticker/ALL_USDT", "USDT")];

const STATUS_OK: &str = "0000";

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Map<String, Value>,
}

pub struct BithumbFetcher {
    client: FetchClient,
    base: Url,
}

impl BithumbFetcher {
    /// # Errors
    /// Returns an error if the base URL is malformed.
    pub fn new(client: FetchClient, base: &str) -> Result<Self> {
        Ok(Self {
            client,
            base: parse_base(base)?,
        })
    }

    async fn fetch_book(&self, path: &str, quote: &str) -> Result<Vec<MarketItem>> {
        let url = endpoint(&self.base, path)?;
        let response: TickerResponse = self.client.get_json(&url, &[]).await?;
        convert(response, quote)
    }
}

fn convert(response: TickerResponse, quote: &str) -> Result<Vec<MarketItem>> {
    if response.status != STATUS_OK {
        return Err(FetchError::Upstream {
            exchange: "bithumb",
            reason: format!(
                "status={} {}",
                response.status,
                response.message.unwrap_or_default()
            )
            .trim_end()
            .to_string(),
        }
        .into());
    }

    let mut items: Vec<MarketItem> = response
        .data
        .into_iter()
        .filter(|(key, value)| key != "date" && value.as_object().is_some_and(|o| !o.is_empty()))
        .map(|(base, _)| {
            let symbol = format!("{}-{quote}", base.to_uppercase());
            MarketItem::spot(ExchangeId::BITHUMB, symbol, &base, quote)
        })
        .collect();
    items.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    Ok(items)
}

#[async_trait]
impl MarketFetcher for BithumbFetcher {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::BITHUMB
    }

    fn name(&self) -> &'static str {
        "bithumb"
    }

    /// Both books are fetched concurrently; one failing book is tolerated.
    async fn fetch_spot(&self) -> Result<Vec<MarketItem>> {
        let [(krw_path, krw), (usdt_path, usdt)] = BOOKS;
        let (krw_items, usdt_items) =
            tokio::join!(self.fetch_book(krw_path, krw), self.fetch_book(usdt_path, usdt));

        let items = match (krw_items, usdt_items) {
            (Ok(mut a), Ok(b)) => {
                a.extend(b);
                a
            }
            (Ok(items), Err(err)) | (Err(err), Ok(items)) => {
                warn!(exchange = "bithumb", error = %err, "Ticker book failed, keeping the other");
                items
            }
            (Err(err), Err(_)) => return Err(err),
        };
        debug!(exchange = "bithumb", count = items.len(), "Tickers parsed");
        Ok(items)
    }

    async fn fetch_futures(&self) -> Result<Vec<MarketItem>> {
        Ok(Vec::new())
    }
}
