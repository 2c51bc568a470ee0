//! Client configuration shared by classification and the HTTP stack.

use serde::{Deserialize, Serialize};

use crate::download::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::parser::{ClassifyOptions, Scheme};

/// Behavioral switches for a [`Library`](crate::Library).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Accept only private IPv4 hosts and IPv6 literals.
    pub restrict_to_lan: bool,
    /// Scheme prepended to input without one.
    pub default_scheme: Scheme,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            restrict_to_lan: false,
            default_scheme: Scheme::Https,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Options for [`classify_with`](crate::parser::classify_with).
    #[must_use]
    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            restrict_to_lan: self.restrict_to_lan,
            default_scheme: self.default_scheme,
        }
    }
}
