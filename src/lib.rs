//! Listwatch - exchange listing reconciliation and comparison lists.
//!
//! Pulls instrument listings from several exchanges, reconciles each snapshot
//! into a persisted active/archived market table, and derives cross-exchange
//! comparison lists from what each exchange currently lists.
//!
//! # Architecture
//!
//! - [`domain`] - Market items, list definitions and rows, symbol parsing
//! - [`port`] - Traits the application depends on (fetchers, repositories)
//! - [`application`] - Sync orchestrator, list and segment derivation, scheduler
//! - [`adapter`] - CLI, HTTP fetch client, exchange feeds, SQLite storage
//! - [`infrastructure`] - Configuration, logging and wiring
//!
//! # Example
//!
//! ```no_run
//! use listwatch::infrastructure::bootstrap::App;
//! use listwatch::infrastructure::config::settings::Config;
//!
//! # async fn run() -> listwatch::error::Result<()> {
//! let config = Config::load("listwatch.toml")?;
//! let app = App::build(&config)?;
//! let report = app.orchestrator.run_all().await?;
//! println!("{}", report.render_table());
//! app.lists.rebuild_filtered(None, None).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
