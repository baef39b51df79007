//! Comparison list derivation.
//!
//! - [`presence`] - Source indexes and target presence sets
//! - [`derive`] - Two-exchange inclusion lists
//! - [`segment`] - Four-way segment partition
//! - [`service`] - Rebuilds over the persistence ports

pub mod config;
pub mod derive;
pub mod presence;
pub mod segment;
pub mod service;

pub use config::{PresenceConfig, QuoteRule, SegmentConfig};
pub use service::ListService;
