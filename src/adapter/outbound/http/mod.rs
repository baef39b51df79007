//! HTTP plumbing shared by the exchange adapters.

pub mod client;
pub mod retry;
pub mod settings;

pub use client::FetchClient;
pub use retry::RetryPolicy;
pub use settings::HttpConfig;
