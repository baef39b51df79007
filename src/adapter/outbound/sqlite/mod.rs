//! SQLite persistence adapters.
//!
//! Provides SQLite-backed market and list repositories using Diesel ORM.
//! All database work runs on the blocking pool.

pub mod blocking;
pub mod database;
pub mod list;
pub mod market;

pub use list::{SqliteListDefsRepository, SqliteListRepository};
pub use market::SqliteMarketRepository;
