//! Exchange-agnostic domain types.

pub mod id;
pub mod list;
pub mod market;
pub mod presence;
pub mod symbol;

pub use id::{ExchangeId, ListId};
pub use list::{format_rows, ListDef, ListKind, ListMode, ListRow, NONE_SENTINEL};
pub use market::{MarketItem, MarketKind, SyncSummary};
pub use presence::{PresenceSet, SourceIndex, SourceInfo};
