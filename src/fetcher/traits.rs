use crate::model::{FetchError, PriceSeries, Query};

#[async_trait::async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch(&self, query: &Query) -> Result<PriceSeries, FetchError>;
}
