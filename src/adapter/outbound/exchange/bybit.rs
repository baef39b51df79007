//! Bybit v5 spot and linear instruments.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::endpoint::{endpoint, integral_size, parse_base};
use crate::adapter::outbound::http::FetchClient;
use crate::domain::{ExchangeId, MarketItem, MarketKind};
use crate::error::{FetchError, Result};
use crate::port::MarketFetcher;

pub const DEFAULT_BASE_URL: &str = "https://api.bybit.com";

const INSTRUMENTS_PATH: &str = "/v5/market/instruments-info";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentsResponse {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    #[serde(default)]
    result: InstrumentsResult,
}

#[derive(Debug, Default, Deserialize)]
struct InstrumentsResult {
    #[serde(default)]
    list: Vec<Instrument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instrument {
    symbol: String,
    #[serde(default)]
    base_coin: String,
    #[serde(default)]
    quote_coin: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    contract_size: Option<String>,
}

pub struct BybitFetcher {
    client: FetchClient,
    base: Url,
}

impl BybitFetcher {
    /// # Errors
    /// Returns an error if the base URL is malformed.
    pub fn new(client: FetchClient, base: &str) -> Result<Self> {
        Ok(Self {
            client,
            base: parse_base(base)?,
        })
    }

    async fn fetch(&self, category: &str, kind: MarketKind) -> Result<Vec<MarketItem>> {
        let url = endpoint(&self.base, INSTRUMENTS_PATH)?;
        let response: InstrumentsResponse = self
            .client
            .get_json(&url, &[("category", category)])
            .await?;
        let items = convert(response, kind)?;
        debug!(exchange = "bybit", category, count = items.len(), "Instruments parsed");
        Ok(items)
    }
}

fn convert(response: InstrumentsResponse, kind: MarketKind) -> Result<Vec<MarketItem>> {
    if response.ret_code != 0 {
        return Err(FetchError::Upstream {
            exchange: "bybit",
            reason: format!("retCode={} {}", response.ret_code, response.ret_msg)
                .trim_end()
                .to_string(),
        }
        .into());
    }

    Ok(response
        .result
        .list
        .into_iter()
        .filter(|i| i.status == "Trading" && !i.base_coin.is_empty() && !i.quote_coin.is_empty())
        .map(|i| match kind {
            MarketKind::Spot => {
                MarketItem::spot(ExchangeId::BYBIT, i.symbol, &i.base_coin, &i.quote_coin)
            }
            MarketKind::Futures => {
                let size = i.contract_size.as_deref().and_then(integral_size);
                MarketItem::futures(ExchangeId::BYBIT, i.symbol, &i.base_coin, &i.quote_coin)
                    .with_contract_size(size)
            }
        })
        .collect())
}

#[async_trait]
impl MarketFetcher for BybitFetcher {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::BYBIT
    }

    fn name(&self) -> &'static str {
        "bybit"
    }

    async fn fetch_spot(&self) -> Result<Vec<MarketItem>> {
        self.fetch("spot", MarketKind::Spot).await
    }

    async fn fetch_futures(&self) -> Result<Vec<MarketItem>> {
        self.fetch("linear", MarketKind::Futures).await
    }
}
