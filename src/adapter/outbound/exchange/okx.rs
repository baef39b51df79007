//! OKX public instruments (SPOT and SWAP).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::endpoint::{endpoint, integral_size, parse_base};
use crate::adapter::outbound::http::FetchClient;
use crate::domain::{ExchangeId, MarketItem, MarketKind};
use crate::error::{FetchError, Result};
use crate::port::MarketFetcher;

pub const DEFAULT_BASE_URL: &str = "https://www.okx.com";

const INSTRUMENTS_PATH: &str = "/api/v5/public/instruments";

#[derive(Debug, Deserialize)]
struct InstrumentsResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Instrument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instrument {
    inst_id: String,
    #[serde(default)]
    base_ccy: String,
    #[serde(default)]
    quote_ccy: String,
    /// Settlement currency; SWAP instruments leave base/quote empty.
    #[serde(default)]
    settle_ccy: String,
    #[serde(default)]
    ct_val: String,
    #[serde(default)]
    state: String,
}

pub struct OkxFetcher {
    client: FetchClient,
    base: Url,
}

impl OkxFetcher {
    /// # Errors
    /// Returns an error if the base URL is malformed.
    pub fn new(client: FetchClient, base: &str) -> Result<Self> {
        Ok(Self {
            client,
            base: parse_base(base)?,
        })
    }

    async fn fetch(&self, inst_type: &str, kind: MarketKind) -> Result<Vec<MarketItem>> {
        let url = endpoint(&self.base, INSTRUMENTS_PATH)?;
        let response: InstrumentsResponse = self
            .client
            .get_json(&url, &[("instType", inst_type)])
            .await?;
        let items = convert(response, kind)?;
        debug!(exchange = "okx", inst_type, count = items.len(), "Instruments parsed");
        Ok(items)
    }
}

/// Base and quote of an instrument, falling back to the `BASE-QUOTE[-SWAP]` id.
fn legs(inst: &Instrument) -> Option<(String, String)> {
    if !inst.base_ccy.is_empty() && !inst.quote_ccy.is_empty() {
        return Some((inst.base_ccy.clone(), inst.quote_ccy.clone()));
    }
    let mut parts = inst.inst_id.split('-');
    let base = parts.next().filter(|s| !s.is_empty())?;
    let quote = parts
        .next()
        .filter(|s| !s.is_empty())
        .or_else(|| (!inst.settle_ccy.is_empty()).then_some(inst.settle_ccy.as_str()))?;
    Some((base.to_string(), quote.to_string()))
}

fn convert(response: InstrumentsResponse, kind: MarketKind) -> Result<Vec<MarketItem>> {
    if let Some(code) = response.code.as_deref().filter(|c| *c != "0" && !c.is_empty()) {
        return Err(FetchError::Upstream {
            exchange: "okx",
            reason: format!("code={code} {}", response.msg).trim_end().to_string(),
        }
        .into());
    }

    Ok(response
        .data
        .iter()
        .filter(|i| i.state.eq_ignore_ascii_case("live"))
        .filter_map(|i| {
            let (base, quote) = legs(i)?;
            let item = match kind {
                MarketKind::Spot => MarketItem::spot(ExchangeId::OKX, i.inst_id.clone(), &base, &quote),
                MarketKind::Futures => {
                    MarketItem::futures(ExchangeId::OKX, i.inst_id.clone(), &base, &quote)
                        .with_contract_size(integral_size(&i.ct_val))
                }
            };
            Some(item)
        })
        .collect())
}

#[async_trait]
impl MarketFetcher for OkxFetcher {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::OKX
    }

    fn name(&self) -> &'static str {
        "okx"
    }

    async fn fetch_spot(&self) -> Result<Vec<MarketItem>> {
        self.fetch("SPOT", MarketKind::Spot).await
    }

    async fn fetch_futures(&self) -> Result<Vec<MarketItem>> {
        self.fetch("SWAP", MarketKind::Futures).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_ids_supply_missing_legs() {
        let response: InstrumentsResponse = serde_json::from_str(
            r#"{"code":"0","msg":"","data":[
                {"instId":"BTC-USDT-SWAP","instType":"SWAP","baseCcy":"","quoteCcy":"","settleCcy":"USDT","ctVal":"0.01","state":"live"},
                {"instId":"DOGE-USDT-SWAP","instType":"SWAP","ctVal":"1000","state":"live"},
                {"instId":"LUNA-USDT-SWAP","instType":"SWAP","ctVal":"1","state":"suspend"}
            ]}"#,
        )
        .unwrap();

        let items = convert(response, MarketKind::Futures).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!((items[0].base.as_str(), items[0].quote.as_str()), ("BTC", "USDT"));
        assert_eq!(items[0].contract_size, None);
        assert_eq!(items[1].contract_size, Some(1000));
    }

    #[test]
    fn spot_uses_reported_currencies() {
        let response: InstrumentsResponse = serde_json::from_str(
            r#"{"code":"0","data":[{"instId":"ETH-USDC","baseCcy":"eth","quoteCcy":"usdc","state":"live"}]}"#,
        )
        .unwrap();
        let items = convert(response, MarketKind::Spot).unwrap();
        assert_eq!(items[0].symbol, "ETH-USDC");
        assert_eq!((items[0].base.as_str(), items[0].quote.as_str()), ("ETH", "USDC"));
    }

    #[test]
    fn error_code_is_upstream_error() {
        let response: InstrumentsResponse =
            serde_json::from_str(r#"{"code":"51000","msg":"Parameter instType error","data":[]}"#)
                .unwrap();
        assert!(convert(response, MarketKind::Spot).is_err());
    }
}
