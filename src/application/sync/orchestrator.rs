//! Concurrent fan-out of market fetchers into the reconciliation engine.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::report::SyncReport;
use crate::domain::{ExchangeId, SyncSummary};
use crate::error::{Error, Result};
use crate::port::{MarketFetcher, MarketRepository};

/// Runs one sync task per fetcher and merges their results.
pub struct SyncOrchestrator {
    fetchers: Vec<Arc<dyn MarketFetcher>>,
    markets: Arc<dyn MarketRepository>,
    task_timeout: Duration,
}

type TaskResult = (ExchangeId, &'static str, std::result::Result<SyncSummary, String>);

impl SyncOrchestrator {
    /// Only the first fetcher per exchange is kept.
    pub fn new(
        fetchers: Vec<Arc<dyn MarketFetcher>>,
        markets: Arc<dyn MarketRepository>,
        task_timeout: Duration,
    ) -> Self {
        let mut seen = BTreeSet::new();
        let fetchers = fetchers
            .into_iter()
            .filter(|f| {
                let first = seen.insert(f.exchange_id());
                if !first {
                    warn!(exchange = f.name(), "Duplicate fetcher ignored");
                }
                first
            })
            .collect();
        Self {
            fetchers,
            markets,
            task_timeout,
        }
    }

    #[must_use]
    pub fn exchange_names(&self) -> Vec<&'static str> {
        self.fetchers.iter().map(|f| f.name()).collect()
    }

    /// Sync every exchange concurrently.
    ///
    /// A failing or timed-out exchange gets a zero summary and a failure
    /// entry without affecting the others.
    ///
    /// # Errors
    /// Returns [`Error::SyncFailed`] only when every exchange failed.
    pub async fn run_all(&self) -> Result<SyncReport> {
        let mut tasks: JoinSet<TaskResult> = JoinSet::new();
        let mut pending: BTreeMap<ExchangeId, &'static str> = BTreeMap::new();

        for fetcher in &self.fetchers {
            let fetcher = Arc::clone(fetcher);
            let markets = Arc::clone(&self.markets);
            let timeout = self.task_timeout;
            pending.insert(fetcher.exchange_id(), fetcher.name());

            tasks.spawn(async move {
                let exchange = fetcher.exchange_id();
                let name = fetcher.name();
                let work = sync_exchange(fetcher.as_ref(), markets.as_ref());
                let outcome = match tokio::time::timeout(timeout, work).await {
                    Ok(Ok(summary)) => Ok(summary),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(Error::Timeout(timeout).to_string()),
                };
                (exchange, name, outcome)
            });
        }

        let mut report = SyncReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((exchange, name, Ok(summary))) => {
                    pending.remove(&exchange);
                    info!(
                        exchange = name,
                        added = summary.added,
                        updated = summary.updated,
                        archived = summary.archived,
                        "Exchange synced"
                    );
                    report.record(exchange, name, summary);
                }
                Ok((exchange, name, Err(reason))) => {
                    pending.remove(&exchange);
                    warn!(exchange = name, error = %reason, "Exchange sync failed");
                    report.record_failure(exchange, name, reason);
                }
                Err(e) => error!(error = %e, "Sync task aborted"),
            }
        }
        for (exchange, name) in pending {
            report.record_failure(exchange, name, "sync task aborted");
        }

        info!("Sync summary\n{}", report.render_table());

        if report.all_failed() {
            return Err(Error::SyncFailed(report.failures));
        }
        Ok(report)
    }
}

/// Fetch spot and futures concurrently and reconcile whatever arrived.
async fn sync_exchange(
    fetcher: &dyn MarketFetcher,
    markets: &dyn MarketRepository,
) -> Result<SyncSummary> {
    let name = fetcher.name();
    let (spot, futures) = tokio::join!(fetcher.fetch_spot(), fetcher.fetch_futures());

    let items = match (spot, futures) {
        (Ok(mut spot), Ok(futures)) => {
            spot.extend(futures);
            spot
        }
        (Ok(spot), Err(e)) => {
            warn!(exchange = name, error = %e, "Futures fetch failed, syncing spot only");
            spot
        }
        (Err(e), Ok(futures)) => {
            warn!(exchange = name, error = %e, "Spot fetch failed, syncing futures only");
            futures
        }
        (Err(spot_err), Err(futures_err)) => {
            warn!(exchange = name, error = %futures_err, "Futures fetch failed");
            return Err(spot_err);
        }
    };

    markets.sync_snapshot(fetcher.exchange_id(), items).await
}
