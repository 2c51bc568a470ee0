//! Error types for the download module.
//!
//! These errors are delivered as the terminal value of a transfer and as the
//! cause of a failed page fetch, so each variant carries the URL involved.

use thiserror::Error;

/// Errors that can occur while fetching a URL.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, broken body stream).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The transport rejected the URL.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The transfer was cancelled because its owner was deleted.
    #[error("transfer of {url} was cancelled")]
    Cancelled {
        /// The URL whose transfer was cancelled.
        url: String,
    },

    /// The body stream failed for a reason other than a reqwest error.
    #[error("transfer of {url} was interrupted: {reason}")]
    Interrupted {
        /// The URL being fetched.
        url: String,
        /// What went wrong.
        reason: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a cancellation error.
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::Cancelled { url: url.into() }
    }

    /// Creates an interruption error for non-reqwest stream failures.
    pub fn interrupted(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Interrupted {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error is a cancellation rather than a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

// No `From<reqwest::Error>`: every variant needs the URL, which the source error
// does not reliably carry. Use the constructors above.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_timeout_display() {
        let error = DownloadError::timeout("https://example.com/a.png");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://example.com/a.png"));
    }

    #[test]
    fn test_download_error_http_status_display() {
        let error = DownloadError::http_status("https://example.com/a.png", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("https://example.com/a.png"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_download_error_cancelled_is_flagged() {
        let error = DownloadError::cancelled("https://example.com/a.png");
        assert!(error.is_cancelled());
        assert!(error.to_string().contains("cancelled"));
        assert!(!DownloadError::timeout("https://example.com").is_cancelled());
    }

    #[test]
    fn test_download_error_interrupted_display() {
        let error = DownloadError::interrupted("https://example.com/a.png", "connection reset");
        let msg = error.to_string();
        assert!(msg.contains("interrupted"));
        assert!(msg.contains("connection reset"));
    }
}
