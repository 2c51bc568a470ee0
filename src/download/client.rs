//! HTTP client wrapper implementing [`Transport`] over reqwest.
//!
//! The client is built once and shared by the page scraper and every image
//! transfer so they reuse the same connection pool.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::transport::{Transport, TransportResponse};
use crate::config::ClientConfig;
use crate::user_agent;

/// HTTP client for page and image fetches with streaming bodies.
///
/// # Example
///
/// ```no_run
/// use ftcr_core::download::{HttpClient, Transport};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let response = client.get(&Url::parse("https://example.com/a.png")?).await?;
/// println!("status {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client using the timeouts from `config`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new_with_timeouts(config.connect_timeout_secs, config.read_timeout_secs)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpClient {
    #[instrument(level = "debug", skip_all, fields(url = %url))]
    async fn get(&self, url: &Url) -> Result<TransportResponse, DownloadError> {
        debug!("sending request");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_request_error(url.as_str(), e))?;

        let status = response.status().as_u16();
        let content_length = response.content_length();
        debug!(status, ?content_length, "response headers received");

        let url_text = url.to_string();
        let body = response
            .bytes_stream()
            .map(move |chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| map_request_error(&url_text, e))
            })
            .boxed();

        Ok(TransportResponse {
            status,
            content_length,
            body,
        })
    }
}

fn map_request_error(url: &str, error: reqwest::Error) -> DownloadError {
    if error.is_timeout() {
        DownloadError::timeout(url)
    } else if error.is_builder() {
        DownloadError::invalid_url(url)
    } else {
        DownloadError::network(url, error)
    }
}
