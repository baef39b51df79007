//! Market fetcher construction.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::exchange::{
    binance, bithumb, bybit, coinbase, okx, upbit, BinanceFetcher, BithumbFetcher, BybitFetcher,
    CoinbaseFetcher, OkxFetcher, UpbitFetcher,
};
use crate::adapter::outbound::http::FetchClient;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::MarketFetcher;

/// Build one fetcher for `slug`, honoring endpoint overrides.
///
/// # Errors
/// Returns [`ConfigError::UnknownExchange`] for exchanges without an adapter.
pub fn build_fetcher(
    config: &Config,
    client: &FetchClient,
    slug: &str,
) -> Result<Arc<dyn MarketFetcher>> {
    let slug = slug.trim().to_ascii_lowercase();
    let endpoint = config.endpoint(&slug);
    let client = client.clone();

    let fetcher: Arc<dyn MarketFetcher> = match slug.as_str() {
        "binance" => Arc::new(BinanceFetcher::new(
            client,
            endpoint.base_or(binance::DEFAULT_SPOT_URL),
            endpoint.futures_or(binance::DEFAULT_FUTURES_URL),
        )?),
        "bybit" => Arc::new(BybitFetcher::new(
            client,
            endpoint.base_or(bybit::DEFAULT_BASE_URL),
        )?),
        "okx" => Arc::new(OkxFetcher::new(client, endpoint.base_or(okx::DEFAULT_BASE_URL))?),
        "coinbase" => Arc::new(CoinbaseFetcher::new(
            client,
            endpoint.base_or(coinbase::DEFAULT_BASE_URL),
        )?),
        "upbit" => Arc::new(UpbitFetcher::new(
            client,
            endpoint.base_or(upbit::DEFAULT_BASE_URL),
        )?),
        "bithumb" => Arc::new(BithumbFetcher::new(
            client,
            endpoint.base_or(bithumb::DEFAULT_BASE_URL),
        )?),
        _ => return Err(ConfigError::UnknownExchange(slug).into()),
    };
    Ok(fetcher)
}

/// Build fetchers for every exchange enabled in `[sync]`.
pub fn build_fetchers(config: &Config) -> Result<Vec<Arc<dyn MarketFetcher>>> {
    let client = FetchClient::from_config(&config.http)?;
    let fetchers = config
        .sync
        .exchanges
        .iter()
        .map(|slug| build_fetcher(config, &client, slug))
        .collect::<Result<Vec<_>>>()?;
    info!(count = fetchers.len(), "Market fetchers built");
    Ok(fetchers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExchangeId;
    use crate::error::{Error, FetchError};

    #[test]
    fn builds_every_default_exchange() {
        let config = Config::default();
        let fetchers = build_fetchers(&config).unwrap();
        let ids: Vec<ExchangeId> = fetchers.iter().map(|f| f.exchange_id()).collect();
        assert_eq!(
            ids,
            vec![
                ExchangeId::BINANCE,
                ExchangeId::BYBIT,
                ExchangeId::OKX,
                ExchangeId::COINBASE,
                ExchangeId::UPBIT,
                ExchangeId::BITHUMB,
            ]
        );
    }

    #[test]
    fn robinhood_has_no_adapter() {
        let config = Config::default();
        let client = FetchClient::from_config(&config.http).unwrap();
        let err = build_fetcher(&config, &client, "robinhood").err().unwrap();
        assert!(matches!(err, Error::Config(ConfigError::UnknownExchange(_))));
    }

    #[test]
    fn malformed_override_is_rejected() {
        let mut config = Config::default();
        config.exchanges.insert(
            "okx".into(),
            crate::adapter::outbound::exchange::EndpointConfig {
                base_url: Some("not a url".into()),
                futures_url: None,
            },
        );
        let client = FetchClient::from_config(&config.http).unwrap();
        assert!(build_fetcher(&config, &client, "okx").is_err());
    }

    #[test]
    fn unusable_user_agent_fails_the_build() {
        let mut config = Config::default();
        config.http.user_agent = "listwatch\n/1.0".into();
        assert!(matches!(
            build_fetchers(&config),
            Err(Error::Fetch(FetchError::Transport(_)))
        ));
    }
}
