//! Binance spot and USD-M futures instruments.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::endpoint::{endpoint, parse_base};
use crate::adapter::outbound::http::FetchClient;
use crate::domain::symbol::split_known_quote;
use crate::domain::{ExchangeId, MarketItem, MarketKind};
use crate::error::Result;
use crate::port::MarketFetcher;

pub const DEFAULT_SPOT_URL: &str = "https://api.binance.com";
pub const DEFAULT_FUTURES_URL: &str = "https://fapi.binance.com";

const SPOT_PATH: &str = "/api/v3/exchangeInfo";
const FUTURES_PATH: &str = "/fapi/v1/exchangeInfo";

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    #[serde(default)]
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    base_asset: String,
    #[serde(default)]
    quote_asset: String,
}

pub struct BinanceFetcher {
    client: FetchClient,
    spot_base: Url,
    futures_base: Url,
}

impl BinanceFetcher {
    /// # Errors
    /// Returns an error if either base URL is malformed.
    pub fn new(client: FetchClient, spot_base: &str, futures_base: &str) -> Result<Self> {
        Ok(Self {
            client,
            spot_base: parse_base(spot_base)?,
            futures_base: parse_base(futures_base)?,
        })
    }

    async fn fetch(&self, base: &Url, path: &str, kind: MarketKind) -> Result<Vec<MarketItem>> {
        let url = endpoint(base, path)?;
        let info: ExchangeInfo = self.client.get_json(&url, &[]).await?;
        let items = convert(info, kind);
        debug!(exchange = "binance", kind = %kind, count = items.len(), "Instruments parsed");
        Ok(items)
    }
}

fn convert(info: ExchangeInfo, kind: MarketKind) -> Vec<MarketItem> {
    info.symbols
        .into_iter()
        .filter(|s| s.status.eq_ignore_ascii_case("TRADING"))
        .filter_map(|s| {
            let (base, quote) = if s.base_asset.is_empty() || s.quote_asset.is_empty() {
                split_known_quote(&s.symbol)?
            } else {
                (s.base_asset, s.quote_asset)
            };
            let item = match kind {
                MarketKind::Spot => MarketItem::spot(ExchangeId::BINANCE, s.symbol, &base, &quote),
                MarketKind::Futures => {
                    MarketItem::futures(ExchangeId::BINANCE, s.symbol, &base, &quote)
                }
            };
            Some(item)
        })
        .collect()
}

#[async_trait]
impl MarketFetcher for BinanceFetcher {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::BINANCE
    }

    fn name(&self) -> &'static str {
        "binance"
    }

    async fn fetch_spot(&self) -> Result<Vec<MarketItem>> {
        self.fetch(&self.spot_base, SPOT_PATH, MarketKind::Spot).await
    }

    async fn fetch_futures(&self) -> Result<Vec<MarketItem>> {
        self.fetch(&self.futures_base, FUTURES_PATH, MarketKind::Futures)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "timezone": "UTC",
        "symbols": [
            {"symbol": "ETHUSDT", "status": "TRADING", "baseAsset": "ETH", "quoteAsset": "USDT"},
            {"symbol": "LUNAUSDT", "status": "BREAK", "baseAsset": "LUNA", "quoteAsset": "USDT"},
            {"symbol": "PEPEFDUSD", "status": "TRADING"}
        ]
    }"#;

    #[test]
    fn converts_trading_symbols_only() {
        let info: ExchangeInfo = serde_json::from_str(PAYLOAD).unwrap();
        let items = convert(info, MarketKind::Spot);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].symbol, "ETHUSDT");
        assert_eq!((items[0].base.as_str(), items[0].quote.as_str()), ("ETH", "USDT"));
        assert!(items.iter().all(|i| i.exchange_id == ExchangeId::BINANCE));
    }

    #[test]
    fn missing_assets_fall_back_to_symbol_split() {
        let info: ExchangeInfo = serde_json::from_str(PAYLOAD).unwrap();
        let items = convert(info, MarketKind::Futures);
        let pepe = items.iter().find(|i| i.symbol == "PEPEFDUSD").unwrap();
        assert_eq!((pepe.base.as_str(), pepe.quote.as_str()), ("PEPE", "FDUSD"));
        assert_eq!(pepe.kind, MarketKind::Futures);
    }
}
