//! Remote forecast source.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use serde_json::Value;

use crate::error::ForecastError;

pub const NEA_FORECAST_URL: &str =
    "https://api.data.gov.sg/v1/environment/4-day-weather-forecast";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("ShoreSquad/", env!("CARGO_PKG_VERSION"));

/// Something that can produce a raw forecast response.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self) -> Result<Value, ForecastError>;
}

/// HTTP GET against the 4-day forecast endpoint.
#[derive(Debug, Clone)]
pub struct HttpForecastSource {
    client: Arc<Client>,
    url: String,
}

impl HttpForecastSource {
    pub fn new(url: impl Into<String>) -> Result<Self, ForecastError> {
        Self::with_options(url, Duration::from_secs(DEFAULT_TIMEOUT_SECS), USER_AGENT)
    }

    /// Source for the public NEA endpoint.
    pub fn nea() -> Result<Self, ForecastError> {
        Self::new(NEA_FORECAST_URL)
    }

    pub fn with_options(
        url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ForecastError> {
        // Every request must bypass intermediate caches.
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ForecastSource for HttpForecastSource {
    async fn fetch(&self) -> Result<Value, ForecastError> {
        tracing::debug!("Fetching forecast from {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ForecastError::Parse(e.to_string()))
    }
}
