//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling, migration support, and per-connection
//! pragmas for SQLite databases.

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{Error, Result};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// A connection checked out of [`DbPool`].
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Applied to every connection handed out by the pool.
const CONNECTION_PRAGMAS: &str = "PRAGMA busy_timeout = 5000;
PRAGMA foreign_keys = ON;
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;";

/// Default number of pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 5;

#[derive(Debug, Clone, Copy)]
struct ConnectionCustomizer;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(CONNECTION_PRAGMAS)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a connection pool for the given database URL.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size.max(1))
        .connection_customizer(Box::new(ConnectionCustomizer))
        .build(manager)
        .map_err(|e| Error::Connection(e.to_string()))
}

/// Check a connection out of the pool.
///
/// # Errors
/// Returns an error if no connection becomes available.
pub fn connect(pool: &DbPool) -> Result<DbConnection> {
    pool.get().map_err(|e| Error::Connection(e.to_string()))
}

/// Run all pending database migrations.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = connect(pool)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Connection(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::RunQueryDsl;

    #[derive(diesel::QueryableByName)]
    struct TableName {
        #[diesel(sql_type = diesel::sql_types::Text)]
        name: String,
    }

    #[derive(diesel::QueryableByName)]
    struct TableCount {
        #[diesel(sql_type = diesel::sql_types::BigInt)]
        count: i64,
    }

    fn temp_pool() -> (tempfile::TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let pool = create_pool(path.to_str().unwrap(), 2).unwrap();
        (dir, pool)
    }

    #[test]
    fn run_migrations_creates_tables() {
        let (_dir, pool) = temp_pool();
        run_migrations(&pool).unwrap();

        let mut conn = pool.get().unwrap();
        let names: Vec<String> = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
        )
        .load::<TableName>(&mut conn)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();

        for table in ["exchanges", "incoming_tickers", "list_defs", "list_items", "markets"] {
            assert!(names.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn run_migrations_is_idempotent() {
        let (_dir, pool) = temp_pool();
        run_migrations(&pool).unwrap();
        run_migrations(&pool).unwrap();

        let mut conn = pool.get().unwrap();
        let count = diesel::sql_query("SELECT COUNT(*) AS count FROM exchanges")
            .load::<TableCount>(&mut conn)
            .unwrap()[0]
            .count;
        assert_eq!(count, 7);
    }

    #[test]
    fn pool_size_is_at_least_one() {
        let pool = create_pool(":memory:", 0).unwrap();
        assert_eq!(pool.max_size(), 1);
    }
}
