//! Periodic auto-update driver.
//!
//! Each run syncs every exchange, then rebuilds the pair lists, then the
//! segment lists. A failing stage is logged and the next stage still runs.
//! At most one run is in flight at a time; a tick that lands while a run is
//! still going is skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::list::ListService;
use super::sync::SyncOrchestrator;
use crate::error::{ConfigError, Error};

/// Scheduler timing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SchedulerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Upper bound for one complete run.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
    #[serde(default = "default_jitter_min_secs")]
    pub jitter_min_secs: u64,
    #[serde(default = "default_jitter_max_secs")]
    pub jitter_max_secs: u64,
}

const fn default_enabled() -> bool {
    true
}

const fn default_interval_secs() -> u64 {
    600
}

const fn default_run_timeout_secs() -> u64 {
    240
}

const fn default_jitter_min_secs() -> u64 {
    5
}

const fn default_jitter_max_secs() -> u64 {
    25
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval_secs(),
            run_timeout_secs: default_run_timeout_secs(),
            jitter_min_secs: default_jitter_min_secs(),
            jitter_max_secs: default_jitter_max_secs(),
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    /// Random start delay within the configured jitter window.
    #[must_use]
    pub fn start_jitter(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.jitter_min_secs..=self.jitter_max_secs);
        Duration::from_secs(secs)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.interval_secs",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.run_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.run_timeout_secs",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.jitter_min_secs > self.jitter_max_secs {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.jitter_min_secs",
                reason: "must be <= jitter_max_secs".to_string(),
            });
        }
        Ok(())
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Completed,
    Failed,
    TimedOut,
    /// Another run was still in flight.
    Skipped,
}

/// Clears the in-flight flag when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Scheduler {
    orchestrator: Arc<SyncOrchestrator>,
    lists: Arc<ListService>,
    config: SchedulerConfig,
    running: AtomicBool,
}

impl Scheduler {
    pub fn new(
        orchestrator: Arc<SyncOrchestrator>,
        lists: Arc<ListService>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            orchestrator,
            lists,
            config,
            running: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run the full pipeline once unless a run is already in flight.
    pub async fn tick(&self) -> TickOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Previous run still in flight, skipping tick");
            return TickOutcome::Skipped;
        }
        let _guard = RunGuard(&self.running);

        let limit = self.config.run_timeout();
        match timeout(limit, self.run_pipeline()).await {
            Ok(0) => TickOutcome::Completed,
            Ok(failed) => {
                warn!(failed_stages = failed, "Auto-update run failed");
                TickOutcome::Failed
            }
            Err(_) => {
                warn!(error = %Error::Timeout(limit), "Auto-update run aborted");
                TickOutcome::TimedOut
            }
        }
    }

    /// Run sync, pair rebuild and segment rebuild. Returns the number of failed stages.
    async fn run_pipeline(&self) -> usize {
        let mut failed = 0;

        match self.orchestrator.run_all().await {
            Ok(report) if !report.failures.is_empty() => {
                warn!(failed = report.failures.len(), "Some exchanges failed to sync");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(stage = "sync", error = %e, "Stage failed");
                failed += 1;
            }
        }

        match self.lists.rebuild_filtered(None, None).await {
            Ok(lists) => info!(lists = lists.len(), "Pair lists refreshed"),
            Err(e) => {
                warn!(stage = "lists", error = %e, "Stage failed");
                failed += 1;
            }
        }

        match self.lists.rebuild_segments(&[]).await {
            Ok(segments) => info!(segments = segments.len(), "Segments refreshed"),
            Err(e) => {
                warn!(stage = "segments", error = %e, "Stage failed");
                failed += 1;
            }
        }

        debug!(failed_stages = failed, "Auto-update run finished");
        failed
    }

    /// Drive ticks until `shutdown` flips to true or its sender is dropped.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let jitter = self.config.start_jitter();
        info!(
            interval_secs = self.config.interval_secs,
            start_in_secs = jitter.as_secs(),
            "Scheduler started"
        );

        tokio::select! {
            () = sleep(jitter) => {}
            _ = wait_for_shutdown(&mut shutdown) => {
                info!("Scheduler stopped before first run");
                return;
            }
        }

        let mut ticker = interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let this = Arc::clone(&self);
                    tokio::spawn(async move {
                        this.tick().await;
                    });
                }
                _ = wait_for_shutdown(&mut shutdown) => break,
            }
        }
        info!("Scheduler stopped");
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
