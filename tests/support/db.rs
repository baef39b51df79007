use diesel::prelude::*;
use listwatch::adapter::outbound::sqlite::database::connection::{
    create_pool, run_migrations, DbPool,
};
use listwatch::adapter::outbound::sqlite::database::schema::markets;
use listwatch::domain::{ExchangeId, MarketKind};
use tempfile::TempDir;

/// Migrated database in a temporary directory. Keep the `TempDir` alive.
pub fn temp_pool() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("listwatch-test.db");
    let pool = create_pool(&format!("sqlite://{}", path.display()), 4).expect("create pool");
    run_migrations(&pool).expect("run migrations");
    (dir, pool)
}

/// Path of a fresh database file inside `dir`.
pub fn db_path(dir: &TempDir) -> String {
    dir.path().join("listwatch.db").display().to_string()
}

/// `(is_active, delisted_at)` of one stored market row.
pub fn market_state(
    pool: &DbPool,
    exchange: ExchangeId,
    symbol: &str,
    kind: MarketKind,
) -> (bool, Option<String>) {
    let mut conn = pool.get().expect("checkout connection");
    markets::table
        .filter(markets::exchange_id.eq(exchange.get()))
        .filter(markets::symbol.eq(symbol))
        .filter(markets::mtype.eq(kind.as_str()))
        .select((markets::is_active, markets::delisted_at))
        .first(&mut conn)
        .expect("market row")
}
