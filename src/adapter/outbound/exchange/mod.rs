//! Exchange feed adapters.
//!
//! Each adapter turns one exchange's public instrument endpoints into
//! [`MarketItem`](crate::domain::MarketItem) snapshots through the shared
//! [`FetchClient`](super::http::FetchClient).

pub mod binance;
pub mod bithumb;
pub mod bybit;
pub mod coinbase;
pub mod endpoint;
pub mod okx;
pub mod upbit;

pub use binance::BinanceFetcher;
pub use bithumb::BithumbFetcher;
pub use bybit::BybitFetcher;
pub use coinbase::CoinbaseFetcher;
pub use endpoint::EndpointConfig;
pub use okx::OkxFetcher;
pub use upbit::UpbitFetcher;
