//! HTTP client for the ticker endpoint.

use chrono::{DateTime, Utc};
use kline_types::RawTicker;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::{decode_tickers, url::DEFAULT_BASE_URL, url::ticker_url};

/// Configuration for the ticker client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Ticker endpoint, without query parameters.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(8),
            user_agent: format!("kline/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Errors that can occur while fetching a poll.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status.
    #[error("Server error: {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Response body was not a JSON array of tickers.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for the pricing API.
///
/// One call to [`fetch`](Self::fetch) is one poll. There are no retries: a
/// failed poll is simply skipped and the next tick tries again.
#[derive(Debug, Clone)]
pub struct TickerClient {
    client: Client,
    config: ClientConfig,
}

impl TickerClient {
    /// Creates a new ticker client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(ClientConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches every ticker row for a poll taken at `at`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status or a body
    /// that does not decode. No partial result is ever returned.
    pub async fn fetch(&self, at: DateTime<Utc>) -> Result<Vec<RawTicker>, FetchError> {
        let url = ticker_url(&self.config.base_url, at);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(decode_tickers(&body)?)
    }
}
