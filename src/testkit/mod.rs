//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for market items and list rows.
//! - [`fetcher`] - `ScriptedFetcher`, a [`MarketFetcher`](crate::port::MarketFetcher)
//!   with canned responses, failures and delays.
//! - [`store`] - In-memory market and list repositories.

pub mod domain;
pub mod fetcher;
pub mod store;
