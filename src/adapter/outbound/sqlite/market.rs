//! SQLite market repository: snapshot reconciliation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::{SmallInt, Text};
use tracing::{debug, info};

use super::blocking::{run_blocking, CancelToken, KeyedLocks};
use super::database::connection::DbPool;
use super::database::model::{MarketRow, StagedTickerRow};
use super::database::schema::{incoming_tickers, markets};
use crate::domain::{ExchangeId, MarketItem, MarketKind, SyncSummary};
use crate::error::{Error, Result};
use crate::port::MarketRepository;

/// Rows per multi-row INSERT; keeps statements under SQLite's variable limit.
const INSERT_CHUNK: usize = 500;

const UPDATE_CHANGED: &str = "
UPDATE markets
SET base_asset = t.base_asset,
    quote_asset = t.quote_asset,
    contract_size = t.contract_size,
    is_active = 1,
    delisted_at = NULL,
    updated_at = ?
FROM incoming_tickers AS t
WHERE t.exchange_id = markets.exchange_id
  AND t.symbol = markets.symbol
  AND t.mtype = markets.mtype
  AND markets.exchange_id = ?
  AND (markets.base_asset IS NOT t.base_asset
       OR markets.quote_asset IS NOT t.quote_asset
       OR markets.contract_size IS NOT t.contract_size
       OR markets.is_active = 0)";

const INSERT_NEW: &str = "
INSERT INTO markets
    (exchange_id, mtype, symbol, base_asset, quote_asset, contract_size,
     is_active, listed_at, updated_at)
SELECT t.exchange_id, t.mtype, t.symbol, t.base_asset, t.quote_asset, t.contract_size,
       1, ?, ?
FROM incoming_tickers AS t
WHERE t.exchange_id = ?
ON CONFLICT (exchange_id, symbol, mtype) DO NOTHING";

const ARCHIVE_MISSING: &str = "
UPDATE markets
SET is_active = 0, delisted_at = ?, updated_at = ?
WHERE exchange_id = ?
  AND is_active = 1
  AND NOT EXISTS (
      SELECT 1 FROM incoming_tickers AS t
      WHERE t.exchange_id = markets.exchange_id
        AND t.symbol = markets.symbol
        AND t.mtype = markets.mtype)";

/// SQLite-backed [`MarketRepository`].
///
/// Reconciliations of one exchange are serialized by an in-process lock and
/// run inside an immediate transaction.
#[derive(Clone)]
pub struct SqliteMarketRepository {
    pool: DbPool,
    locks: Arc<KeyedLocks<ExchangeId>>,
}

impl SqliteMarketRepository {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            locks: Arc::new(KeyedLocks::new()),
        }
    }
}

/// Last occurrence of each identity wins.
fn dedup_snapshot(exchange: ExchangeId, items: Vec<MarketItem>) -> Vec<MarketItem> {
    let mut by_identity: BTreeMap<(MarketKind, String), MarketItem> = BTreeMap::new();
    for mut item in items {
        item.exchange_id = exchange;
        by_identity.insert((item.kind, item.symbol.clone()), item);
    }
    by_identity.into_values().collect()
}

/// Reconcile one exchange's snapshot inside an immediate transaction.
pub(crate) fn reconcile(
    conn: &mut SqliteConnection,
    exchange: ExchangeId,
    items: &[MarketItem],
    token: &CancelToken,
) -> Result<SyncSummary> {
    let now = Utc::now().to_rfc3339();
    let ex = exchange.get();

    conn.immediate_transaction::<_, Error, _>(|conn| {
        diesel::delete(incoming_tickers::table.filter(incoming_tickers::exchange_id.eq(ex)))
            .execute(conn)?;

        let staged: Vec<StagedTickerRow<'_>> = items.iter().map(StagedTickerRow::from).collect();
        for chunk in staged.chunks(INSERT_CHUNK) {
            diesel::insert_into(incoming_tickers::table)
                .values(chunk)
                .execute(conn)?;
        }
        token.check()?;

        let updated = diesel::sql_query(UPDATE_CHANGED)
            .bind::<Text, _>(&now)
            .bind::<SmallInt, _>(ex)
            .execute(conn)?;
        token.check()?;

        let added = diesel::sql_query(INSERT_NEW)
            .bind::<Text, _>(&now)
            .bind::<Text, _>(&now)
            .bind::<SmallInt, _>(ex)
            .execute(conn)?;
        token.check()?;

        let archived = diesel::sql_query(ARCHIVE_MISSING)
            .bind::<Text, _>(&now)
            .bind::<Text, _>(&now)
            .bind::<SmallInt, _>(ex)
            .execute(conn)?;

        diesel::delete(incoming_tickers::table.filter(incoming_tickers::exchange_id.eq(ex)))
            .execute(conn)?;
        token.check()?;

        Ok(SyncSummary::new(added, updated, archived))
    })
}

pub(crate) fn load_active(conn: &mut SqliteConnection, exchange: ExchangeId) -> Result<Vec<MarketItem>> {
    let rows: Vec<MarketRow> = markets::table
        .filter(markets::exchange_id.eq(exchange.get()))
        .filter(markets::is_active.eq(true))
        .select(MarketRow::as_select())
        .load(conn)
        .map_err(|e| Error::Database(e.to_string()))?;

    let mut items = rows
        .into_iter()
        .map(MarketItem::try_from)
        .collect::<Result<Vec<_>>>()?;
    items.sort_by(|a, b| (a.kind, &a.symbol).cmp(&(b.kind, &b.symbol)));
    Ok(items)
}

#[async_trait]
impl MarketRepository for SqliteMarketRepository {
    async fn sync_snapshot(
        &self,
        exchange: ExchangeId,
        items: Vec<MarketItem>,
    ) -> Result<SyncSummary> {
        let items = dedup_snapshot(exchange, items);
        let staged = items.len();
        let lock = self.locks.get(&exchange);

        let summary = run_blocking(&self.pool, move |conn, token| {
            let _held = lock.lock();
            token.check()?;
            reconcile(conn, exchange, &items, token)
        })
        .await?;

        info!(
            exchange = %exchange,
            staged,
            added = summary.added,
            updated = summary.updated,
            archived = summary.archived,
            "Snapshot reconciled"
        );
        Ok(summary)
    }

    async fn load_active_by_exchange(&self, exchange: ExchangeId) -> Result<Vec<MarketItem>> {
        let items = run_blocking(&self.pool, move |conn, _| load_active(conn, exchange)).await?;
        debug!(exchange = %exchange, count = items.len(), "Active markets loaded");
        Ok(items)
    }
}
