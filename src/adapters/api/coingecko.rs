//! CoinGecko Price Client - Simple Price Endpoint
//!
//! Issues one GET against `/api/v3/simple/price` per tick and hands
//! the decoded JSON body to the pipeline. Any transport error, non-2xx
//! status, or undecodable body collapses to "no data" for that tick.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::domain::quote::RawResponse;
use crate::ports::price_source::PriceSource;

/// Default price endpoint: Bitcoin quoted in US dollars.
pub const COINGECKO_SIMPLE_PRICE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd";

/// Why a fetch produced no data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, or timeout failure.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The API answered with a non-2xx status.
    #[error("HTTP status {0}")]
    Status(StatusCode),
    /// The body was not valid JSON.
    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Configuration for the HTTP price source.
#[derive(Debug, Clone)]
pub struct HttpPriceSourceConfig {
    /// Full request URL, query string included.
    pub url: String,
    /// Whole-request timeout. `None` leaves reqwest's default (no timeout).
    pub timeout: Option<Duration>,
}

impl Default for HttpPriceSourceConfig {
    fn default() -> Self {
        Self {
            url: COINGECKO_SIMPLE_PRICE_URL.to_string(),
            timeout: None,
        }
    }
}

/// HTTP client for the CoinGecko simple price endpoint.
pub struct HttpPriceSource {
    /// Underlying HTTP client.
    http: Client,
    /// Client configuration.
    config: HttpPriceSourceConfig,
}

impl HttpPriceSource {
    /// Create a new price source.
    pub fn new(config: HttpPriceSourceConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, config })
    }

    /// Perform the request, keeping the failure cause.
    #[instrument(skip(self), fields(url = %self.config.url))]
    pub async fn try_fetch(&self) -> Result<RawResponse, FetchError> {
        let response = self
            .http
            .get(&self.config.url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response
            .json::<RawResponse>()
            .await
            .map_err(FetchError::Decode)
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch(&self) -> Option<RawResponse> {
        match self.try_fetch().await {
            Ok(data) => {
                info!("Successfully fetched data from API");
                Some(data)
            }
            Err(e) => {
                error!("API request failed: {e}");
                None
            }
        }
    }
}
