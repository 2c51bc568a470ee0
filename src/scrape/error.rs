//! Error types for page scraping.

use thiserror::Error;

use crate::download::DownloadError;

/// Errors raised while fetching or reading a page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The page could not be fetched.
    #[error("failed to fetch page: {0}")]
    Fetch(#[from] DownloadError),

    /// The page body is not UTF-8 text.
    #[error("page {url} is not UTF-8 text")]
    NotUtf8 {
        /// The page URL.
        url: String,
    },
}

impl ScrapeError {
    /// Creates an error for a body that failed UTF-8 decoding.
    pub fn not_utf8(url: impl Into<String>) -> Self {
        Self::NotUtf8 { url: url.into() }
    }
}
