//! Market snapshot synchronisation.

pub mod config;
pub mod orchestrator;
pub mod report;

pub use config::SyncConfig;
pub use orchestrator::SyncOrchestrator;
pub use report::{SummaryLine, SyncReport};
