//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{exchanges, incoming_tickers, list_defs, list_items, markets};
use crate::domain::{ExchangeId, ListRow, MarketItem, MarketKind};
use crate::error::{Error, Result};

/// Database row for an exchange.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = exchanges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeRow {
    pub id: i16,
    pub slug: String,
    pub name: String,
}

/// Active or archived market row (queryable projection).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = markets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketRow {
    pub exchange_id: i16,
    pub mtype: String,
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub contract_size: Option<i64>,
    pub is_active: bool,
}

impl TryFrom<MarketRow> for MarketItem {
    type Error = Error;

    fn try_from(row: MarketRow) -> Result<Self> {
        let kind: MarketKind = row.mtype.parse().map_err(Error::Parse)?;
        Ok(Self {
            exchange_id: ExchangeId::new(row.exchange_id),
            kind,
            symbol: row.symbol,
            base: row.base_asset,
            quote: row.quote_asset,
            contract_size: row.contract_size,
            active: row.is_active,
        })
    }
}

/// Staged snapshot row.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = incoming_tickers)]
pub struct StagedTickerRow<'a> {
    pub exchange_id: i16,
    pub mtype: &'static str,
    pub symbol: &'a str,
    pub base_asset: &'a str,
    pub quote_asset: &'a str,
    pub contract_size: Option<i64>,
}

impl<'a> From<&'a MarketItem> for StagedTickerRow<'a> {
    fn from(item: &'a MarketItem) -> Self {
        Self {
            exchange_id: item.exchange_id.get(),
            mtype: item.kind.as_str(),
            symbol: &item.symbol,
            base_asset: &item.base,
            quote_asset: &item.quote,
            contract_size: item.contract_size,
        }
    }
}

/// Database row for a list definition.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = list_defs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ListDefRow {
    pub id: i32,
    pub slug: String,
    pub kind: String,
    pub source_exchange_id: i16,
    pub target_exchange_id: i16,
    pub updated_at: Option<String>,
}

/// Database row for one list entry.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = list_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ListItemRow {
    pub list_id: i32,
    pub spot_symbol: String,
    pub futures_symbol: Option<String>,
}

impl From<ListItemRow> for ListRow {
    fn from(row: ListItemRow) -> Self {
        ListRow::new(row.spot_symbol, row.futures_symbol)
    }
}
