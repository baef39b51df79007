//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.
//!
//! - [`sync`] - Concurrent exchange sync and its summary report
//! - [`list`] - Pair-list and segment derivation
//! - [`scheduler`] - Periodic auto-update driver

pub mod list;
pub mod scheduler;
pub mod sync;
