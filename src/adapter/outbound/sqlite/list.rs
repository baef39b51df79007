//! SQLite list definitions and list contents.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use tracing::info;

use super::blocking::{run_blocking, CancelToken, KeyedLocks};
use super::database::connection::DbPool;
use super::database::model::{ExchangeRow, ListDefRow, ListItemRow};
use super::database::schema::{exchanges, list_defs, list_items};
use crate::domain::{ExchangeId, ListDef, ListId, ListKind, ListRow};
use crate::error::{Error, Result};
use crate::port::{ListDefFilter, ListDefsRepository, ListRepository};

const INSERT_CHUNK: usize = 500;

/// SQLite-backed [`ListDefsRepository`].
#[derive(Clone)]
pub struct SqliteListDefsRepository {
    pool: DbPool,
}

impl SqliteListDefsRepository {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn exchange_slugs(conn: &mut SqliteConnection) -> Result<HashMap<i16, String>> {
    let rows: Vec<ExchangeRow> = exchanges::table
        .select(ExchangeRow::as_select())
        .load(conn)
        .map_err(|e| Error::Database(e.to_string()))?;
    Ok(rows.into_iter().map(|r| (r.id, r.slug)).collect())
}

fn to_def(row: ListDefRow, slugs: &HashMap<i16, String>) -> Result<ListDef> {
    let kind: ListKind = row.kind.parse().map_err(Error::Parse)?;
    let slug_of = |id: i16| {
        slugs
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::Database(format!("list {} references unknown exchange {id}", row.slug)))
    };
    Ok(ListDef {
        id: ListId::new(row.id),
        kind,
        source_id: ExchangeId::new(row.source_exchange_id),
        source_slug: slug_of(row.source_exchange_id)?,
        target_id: ExchangeId::new(row.target_exchange_id),
        target_slug: slug_of(row.target_exchange_id)?,
        slug: row.slug,
    })
}

fn load_defs(conn: &mut SqliteConnection, filter: &ListDefFilter) -> Result<Vec<ListDef>> {
    let slugs = exchange_slugs(conn)?;
    let rows: Vec<ListDefRow> = list_defs::table
        .order(list_defs::id.asc())
        .select(ListDefRow::as_select())
        .load(conn)
        .map_err(|e| Error::Database(e.to_string()))?;

    let matches = |want: &Option<String>, have: &str| {
        want.as_deref()
            .map_or(true, |w| w.trim().eq_ignore_ascii_case(have))
    };

    rows.into_iter()
        .map(|row| to_def(row, &slugs))
        .filter(|def| match def {
            Ok(def) => {
                matches(&filter.source_slug, &def.source_slug)
                    && matches(&filter.target_slug, &def.target_slug)
                    && filter.kind.map_or(true, |k| k == def.kind)
            }
            Err(_) => true,
        })
        .collect()
}

fn def_by_slug(conn: &mut SqliteConnection, slug: &str) -> Result<Option<ListDef>> {
    let row: Option<ListDefRow> = list_defs::table
        .filter(list_defs::slug.eq(slug))
        .select(ListDefRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| Error::Database(e.to_string()))?;
    match row {
        Some(row) => {
            let slugs = exchange_slugs(conn)?;
            to_def(row, &slugs).map(Some)
        }
        None => Ok(None),
    }
}

#[async_trait]
impl ListDefsRepository for SqliteListDefsRepository {
    async fn find(&self, filter: &ListDefFilter) -> Result<Vec<ListDef>> {
        let filter = filter.clone();
        run_blocking(&self.pool, move |conn, _| load_defs(conn, &filter)).await
    }

    async fn get_by_id(&self, id: ListId) -> Result<Option<ListDef>> {
        run_blocking(&self.pool, move |conn, _| {
            let row: Option<ListDefRow> = list_defs::table
                .find(id.get())
                .select(ListDefRow::as_select())
                .first(conn)
                .optional()
                .map_err(|e| Error::Database(e.to_string()))?;
            match row {
                Some(row) => {
                    let slugs = exchange_slugs(conn)?;
                    to_def(row, &slugs).map(Some)
                }
                None => Ok(None),
            }
        })
        .await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<ListDef>> {
        let slug = slug.to_string();
        run_blocking(&self.pool, move |conn, _| def_by_slug(conn, &slug)).await
    }

    async fn ids_by_slugs(&self, slugs: &[String]) -> Result<Vec<(String, ListId)>> {
        let slugs = slugs.to_vec();
        run_blocking(&self.pool, move |conn, _| {
            let rows: Vec<(String, i32)> = list_defs::table
                .filter(list_defs::slug.eq_any(&slugs))
                .order(list_defs::id.asc())
                .select((list_defs::slug, list_defs::id))
                .load(conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(rows
                .into_iter()
                .map(|(slug, id)| (slug, ListId::new(id)))
                .collect())
        })
        .await
    }
}

/// SQLite-backed [`ListRepository`].
///
/// A replace deletes and re-inserts the list inside one immediate
/// transaction; replaces of the same list are serialized.
#[derive(Clone)]
pub struct SqliteListRepository {
    pool: DbPool,
    locks: Arc<KeyedLocks<ListId>>,
}

impl SqliteListRepository {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            locks: Arc::new(KeyedLocks::new()),
        }
    }
}

/// First occurrence of each spot symbol wins; order is preserved.
fn dedup_rows(rows: Vec<ListRow>) -> Vec<ListRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.spot.clone()))
        .collect()
}

pub(crate) fn replace_rows(
    conn: &mut SqliteConnection,
    list_id: ListId,
    rows: &[ListRow],
    token: &CancelToken,
) -> Result<usize> {
    let id = list_id.get();
    let now = Utc::now().to_rfc3339();

    conn.immediate_transaction::<_, Error, _>(|conn| {
        let touched = diesel::update(list_defs::table.find(id))
            .set(list_defs::updated_at.eq(now.as_str()))
            .execute(conn)?;
        if touched == 0 {
            return Err(Error::ListNotFound(list_id.to_string()));
        }

        diesel::delete(list_items::table.filter(list_items::list_id.eq(id))).execute(conn)?;
        token.check()?;

        let items: Vec<ListItemRow> = rows
            .iter()
            .map(|row| ListItemRow {
                list_id: id,
                spot_symbol: row.spot.clone(),
                futures_symbol: row.futures.clone(),
            })
            .collect();
        let mut inserted = 0;
        for chunk in items.chunks(INSERT_CHUNK) {
            inserted += diesel::insert_into(list_items::table)
                .values(chunk)
                .execute(conn)?;
        }
        token.check()?;

        Ok(inserted)
    })
}

fn rows_for(conn: &mut SqliteConnection, list_id: ListId) -> Result<Vec<ListRow>> {
    let rows: Vec<ListItemRow> = list_items::table
        .filter(list_items::list_id.eq(list_id.get()))
        .order(list_items::spot_symbol.asc())
        .select(ListItemRow::as_select())
        .load(conn)
        .map_err(|e| Error::Database(e.to_string()))?;
    Ok(rows.into_iter().map(ListRow::from).collect())
}

#[async_trait]
impl ListRepository for SqliteListRepository {
    async fn replace(&self, list_id: ListId, rows: Vec<ListRow>) -> Result<usize> {
        let rows = dedup_rows(rows);
        let lock = self.locks.get(&list_id);

        let count = run_blocking(&self.pool, move |conn, token| {
            let _held = lock.lock();
            token.check()?;
            replace_rows(conn, list_id, &rows, token)
        })
        .await?;

        info!(list_id = %list_id, rows = count, "List replaced");
        Ok(count)
    }

    async fn replace_by_slug(&self, slug: &str, rows: Vec<ListRow>) -> Result<usize> {
        let owned = slug.to_string();
        let def = run_blocking(&self.pool, move |conn, _| def_by_slug(conn, &owned))
            .await?
            .ok_or_else(|| Error::ListNotFound(slug.to_string()))?;
        self.replace(def.id, rows).await
    }

    async fn rows_by_slug(&self, slug: &str) -> Result<Vec<ListRow>> {
        let owned = slug.to_string();
        run_blocking(&self.pool, move |conn, _| {
            let def =
                def_by_slug(conn, &owned)?.ok_or_else(|| Error::ListNotFound(owned.clone()))?;
            rows_for(conn, def.id)
        })
        .await
    }
}
