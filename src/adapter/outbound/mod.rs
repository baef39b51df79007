//! Outbound adapters (driven side).

pub mod exchange;
pub mod http;
pub mod sqlite;
