//! Persistence factory for the SQLite repositories.

use std::sync::Arc;

use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations, DbPool};
use crate::adapter::outbound::sqlite::{
    SqliteListDefsRepository, SqliteListRepository, SqliteMarketRepository,
};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::{ListDefsRepository, ListRepository, MarketRepository};

/// The three repositories sharing one pool.
#[derive(Clone)]
pub struct Repositories {
    pub markets: Arc<dyn MarketRepository>,
    pub defs: Arc<dyn ListDefsRepository>,
    pub lists: Arc<dyn ListRepository>,
}

/// Open the database, apply pending migrations and return the pool.
pub fn build_pool(config: &Config) -> Result<DbPool> {
    let pool = create_pool(&config.database_url(), config.pool_size)?;
    run_migrations(&pool)?;
    Ok(pool)
}

#[must_use]
pub fn build_repositories(pool: &DbPool) -> Repositories {
    Repositories {
        markets: Arc::new(SqliteMarketRepository::new(pool.clone())),
        defs: Arc::new(SqliteListDefsRepository::new(pool.clone())),
        lists: Arc::new(SqliteListRepository::new(pool.clone())),
    }
}
