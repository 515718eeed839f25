use crate::fetcher::traits::MarketDataSource;
use crate::model::{FetchError, PriceSeries, Query};
use crate::parser::{Parser, TimeSeriesParser};
use crate::utils::redacted_url;

use async_trait::async_trait;
use reqwest::{Client, Request};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Market-data client for the Alpha Vantage `query` endpoint.
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
    parser: TimeSeriesParser,
}

impl AlphaVantageClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, FetchError> {
        let mut builder =
            Client::builder().user_agent(concat!("tickerboard/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
            parser: TimeSeriesParser::new(),
        })
    }

    fn query_params(&self, query: &Query) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("function", query.timespan().function().to_string()),
            ("symbol", query.symbol().to_string()),
            ("apikey", self.api_key.clone()),
            ("datatype", "json".to_string()),
        ];
        if let Some(interval) = query.interval() {
            params.push(("interval", interval.to_string()));
        }
        params
    }

    pub fn build_request(&self, query: &Query) -> Result<Request, FetchError> {
        Ok(self
            .client
            .get(&self.base_url)
            .query(&self.query_params(query))
            .build()?)
    }
}

#[async_trait]
impl MarketDataSource for AlphaVantageClient {
    async fn fetch(&self, query: &Query) -> Result<PriceSeries, FetchError> {
        let request = self.build_request(query)?;
        debug!("GET {}", redacted_url(request.url()));

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("Provider responded [{}] for {}", status, query.symbol());
            return Err(FetchError::Transport(format!("HTTP {}: {}", status, body)));
        }

        let series = self.parser.parse(&body)?;
        info!("Fetched {} rows for {}", series.len(), query.symbol());
        Ok(series)
    }
}
