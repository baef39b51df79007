//! Adapters connecting the application to the outside world.
//!
//! - [`inbound`] - Command-line interface
//! - [`outbound`] - Exchange feeds, HTTP client, SQLite persistence

pub mod inbound;
pub mod outbound;
