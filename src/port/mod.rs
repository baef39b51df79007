//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Adapters implement these to plug exchange feeds and storage into the
//! application services.
//!
//! ```text
//!   ┌─────────────┐      ┌────────────────────┐      ┌─────────────┐
//!   │  Exchange   │ ───▶ │    Application     │ ───▶ │   SQLite    │
//!   │  adapters   │      │ sync / list / seg  │      │   adapter   │
//!   └─────────────┘      └────────────────────┘      └─────────────┘
//! ```

pub mod outbound;

pub use outbound::exchange::MarketFetcher;
pub use outbound::store::{ListDefFilter, ListDefsRepository, ListRepository, MarketRepository};
