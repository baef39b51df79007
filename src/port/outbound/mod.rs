//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the exchange feeds and the persistence layer.

pub mod exchange;
pub mod store;
