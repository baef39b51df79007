//! Composition root: wires configuration into runnable services.

use std::sync::Arc;

use tracing::info;

use crate::application::list::ListService;
use crate::application::scheduler::Scheduler;
use crate::application::sync::SyncOrchestrator;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::exchange::build_fetchers;
use crate::infrastructure::factory::persistence::{build_pool, build_repositories, Repositories};

/// Fully wired services sharing one database pool.
pub struct App {
    pub repositories: Repositories,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub lists: Arc<ListService>,
}

impl App {
    /// Open the database and build every service from `config`.
    pub fn build(config: &Config) -> Result<Self> {
        let pool = build_pool(config)?;
        let repositories = build_repositories(&pool);
        info!(database = %config.database, "Database ready");
        Self::from_parts(config, repositories)
    }

    /// Build services over existing repositories.
    pub fn from_parts(config: &Config, repositories: Repositories) -> Result<Self> {
        let fetchers = build_fetchers(config)?;
        let orchestrator = Arc::new(SyncOrchestrator::new(
            fetchers,
            Arc::clone(&repositories.markets),
            config.sync.task_timeout(),
        ));
        let lists = Arc::new(build_list_service(config, &repositories));
        Ok(Self {
            repositories,
            orchestrator,
            lists,
        })
    }

    #[must_use]
    pub fn scheduler(&self, config: &Config) -> Arc<Scheduler> {
        Arc::new(Scheduler::new(
            Arc::clone(&self.orchestrator),
            Arc::clone(&self.lists),
            config.scheduler.clone(),
        ))
    }
}

/// List service without fetchers, for commands that only touch stored state.
#[must_use]
pub fn build_list_service(config: &Config, repositories: &Repositories) -> ListService {
    ListService::new(
        Arc::clone(&repositories.markets),
        Arc::clone(&repositories.defs),
        Arc::clone(&repositories.lists),
        config.presence.clone(),
        config.segments.clone(),
    )
}
