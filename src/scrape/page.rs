//! Page fetching on top of the shared transport.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use url::Url;

use super::error::ScrapeError;
use super::extract::extract_image_urls;
use crate::download::{DownloadError, Transport};

/// Fetches pages and lists the images they reference.
#[derive(Debug, Clone)]
pub struct PageScraper {
    transport: Arc<dyn Transport>,
}

impl PageScraper {
    /// Creates a scraper that fetches through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Downloads `url` and returns its body as text.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Fetch`] on transport failure or a non-2xx status,
    /// and [`ScrapeError::NotUtf8`] if the body is not valid UTF-8.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_page(&self, url: &Url) -> Result<String, ScrapeError> {
        let response = self.transport.get(url).await?;
        if !response.is_success() {
            return Err(DownloadError::http_status(url.as_str(), response.status).into());
        }

        let bytes = response.collect_body().await?;
        debug!(bytes = bytes.len(), "page fetched");
        String::from_utf8(bytes).map_err(|_| ScrapeError::not_utf8(url.as_str()))
    }

    /// Fetches `url` and extracts its image links, resolved against `url`.
    ///
    /// # Errors
    ///
    /// Propagates any [`fetch_page`](Self::fetch_page) error. Zero matches is
    /// not an error.
    pub async fn scrape(&self, url: &Url) -> Result<Vec<Url>, ScrapeError> {
        let text = self.fetch_page(url).await?;
        let urls = extract_image_urls(&text, url);
        info!(url = %url, images = urls.len(), "page scraped");
        Ok(urls)
    }
}
