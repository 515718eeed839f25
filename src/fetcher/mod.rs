pub mod client;
pub mod traits;

pub use client::AlphaVantageClient;
pub use traits::MarketDataSource;
