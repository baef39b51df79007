//! Scripted market fetcher.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ExchangeId, MarketItem};
use crate::error::{FetchError, Result};
use crate::port::MarketFetcher;

/// Returns canned spot/futures listings, or fails with a canned reason.
pub struct ScriptedFetcher {
    exchange_id: ExchangeId,
    name: &'static str,
    spot: std::result::Result<Vec<MarketItem>, String>,
    futures: std::result::Result<Vec<MarketItem>, String>,
    delay: Duration,
    spot_calls: AtomicUsize,
    futures_calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(exchange_id: ExchangeId, name: &'static str) -> Self {
        Self {
            exchange_id,
            name,
            spot: Ok(Vec::new()),
            futures: Ok(Vec::new()),
            delay: Duration::ZERO,
            spot_calls: AtomicUsize::new(0),
            futures_calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_spot(mut self, items: Vec<MarketItem>) -> Self {
        self.spot = Ok(items);
        self
    }

    #[must_use]
    pub fn with_futures(mut self, items: Vec<MarketItem>) -> Self {
        self.futures = Ok(items);
        self
    }

    #[must_use]
    pub fn failing_spot(mut self, reason: &str) -> Self {
        self.spot = Err(reason.to_string());
        self
    }

    #[must_use]
    pub fn failing_futures(mut self, reason: &str) -> Self {
        self.futures = Err(reason.to_string());
        self
    }

    /// Sleep this long before answering each call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn spot_calls(&self) -> usize {
        self.spot_calls.load(Ordering::SeqCst)
    }

    pub fn futures_calls(&self) -> usize {
        self.futures_calls.load(Ordering::SeqCst)
    }

    async fn answer(
        &self,
        script: &std::result::Result<Vec<MarketItem>, String>,
    ) -> Result<Vec<MarketItem>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        script.clone().map_err(|reason| {
            FetchError::Upstream {
                exchange: self.name,
                reason,
            }
            .into()
        })
    }
}

#[async_trait]
impl MarketFetcher for ScriptedFetcher {
    fn exchange_id(&self) -> ExchangeId {
        self.exchange_id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_spot(&self) -> Result<Vec<MarketItem>> {
        self.spot_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(&self.spot).await
    }

    async fn fetch_futures(&self) -> Result<Vec<MarketItem>> {
        self.futures_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(&self.futures).await
    }
}
