//! Error types for URL classification.

use thiserror::Error;

/// Maximum URL length to accept (standard browser limit).
/// URLs longer than this are rejected before parsing.
pub const MAX_URL_LENGTH: usize = 2000;

/// Errors that can occur while classifying user input.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// URL is malformed or uses an unsupported scheme
    #[error("invalid URL '{url}': {reason}\n  Suggestion: {suggestion}")]
    InvalidUrl {
        /// The URL that failed validation
        url: String,
        /// Why the URL is invalid
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// URL exceeds maximum allowed length
    #[error(
        "URL too long ({length} chars, max {max}): {url_preview}...\n  Suggestion: Check for extraneous content pasted with the link"
    )]
    UrlTooLong {
        /// Truncated URL for display
        url_preview: String,
        /// Actual length
        length: usize,
        /// Maximum allowed
        max: usize,
    },

    /// LAN-only mode is enabled and the host is not a private address
    #[error(
        "host '{host}' is not a local network address\n  Suggestion: Use a 10.x, 172.16-31.x, 192.168.x or IPv6 literal host, or disable restrict_to_lan"
    )]
    NotLan {
        /// The full URL that was rejected
        url: String,
        /// The offending host
        host: String,
    },
}

impl ParseError {
    /// Creates an `InvalidUrl` error for empty input.
    #[must_use]
    pub fn empty() -> Self {
        Self::InvalidUrl {
            url: String::new(),
            reason: "input is empty".to_string(),
            suggestion: "Enter an image or page address".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for a non-web URL scheme.
    #[must_use]
    pub fn unsupported_scheme(url: &str, scheme: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: format!("scheme '{scheme}' is not supported"),
            suggestion: "Use http:// or https:// URLs".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for a malformed URL.
    #[must_use]
    pub fn malformed(url: &str, parse_error: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: parse_error.to_string(),
            suggestion: "Check the URL format and try again".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for a URL without a host.
    #[must_use]
    pub fn no_host(url: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
            suggestion: "Ensure the URL includes a host (e.g., example.com or 192.168.1.2)"
                .to_string(),
        }
    }

    /// Creates a `UrlTooLong` error for URLs exceeding the maximum length.
    #[must_use]
    pub fn too_long(url: &str) -> Self {
        Self::UrlTooLong {
            url_preview: url.chars().take(50).collect(),
            length: url.len(),
            max: MAX_URL_LENGTH,
        }
    }

    /// Creates a `NotLan` error for hosts rejected by LAN-only mode.
    #[must_use]
    pub fn not_lan(url: &str, host: &str) -> Self {
        Self::NotLan {
            url: url.to_string(),
            host: host.to_string(),
        }
    }
}
