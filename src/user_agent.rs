//! Shared User-Agent string for page and image requests.
//!
//! Scrapes and transfers go through the same client, so a single format keeps
//! traffic consistent and easy to identify in server logs.

/// Default User-Agent for every outbound request (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("ftcr/{version} (image-collector)")
}
