//! URL normalization and classification of user input.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::{Host, Url};

use super::error::{MAX_URL_LENGTH, ParseError};

/// File extensions (lowercase, without dot) that mark a URL as a single image.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpeg", "jpg", "png", "gif", "svg", "heic", "heics", "heif", "ico", "bmp", "cur", "tiff", "tif",
    "atx", "pbm",
];

/// Scheme prepended to input that carries no `http://` or `https://` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP, typical for LAN image servers.
    Http,
    /// HTTPS.
    #[default]
    Https,
}

impl Scheme {
    /// Returns the scheme name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Http => "http://",
            Self::Https => "https://",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(format!("invalid scheme: {other} (expected http or https)")),
        }
    }
}

/// What a classified URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// The URL names one image file.
    Single,
    /// The URL names a page that may embed or link many images.
    Page,
}

/// Result of classifying raw user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Whether the URL targets a single image or a page.
    pub kind: TargetKind,
    /// The normalized absolute URL.
    pub url: Url,
}

/// Knobs for [`classify_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Only accept private IPv4 hosts (10/8, 172.16/12, 192.168/16) or IPv6 literals.
    pub restrict_to_lan: bool,
    /// Scheme prepended when the input has none.
    pub default_scheme: Scheme,
}

/// Classifies raw input with default options (any host, `https://` default scheme).
///
/// # Errors
///
/// Returns [`ParseError`] when the input cannot be turned into an absolute http(s) URL.
///
/// # Examples
///
/// ```
/// use ftcr_core::parser::{TargetKind, classify};
///
/// let target = classify("example.com/a.png").unwrap();
/// assert_eq!(target.kind, TargetKind::Single);
/// assert_eq!(target.url.as_str(), "https://example.com/a.png");
/// ```
pub fn classify(raw: &str) -> Result<Classification, ParseError> {
    classify_with(raw, &ClassifyOptions::default())
}

/// Normalizes raw input into an absolute URL and decides whether it names an image or a page.
///
/// # Errors
///
/// Returns [`ParseError::InvalidUrl`] for empty, malformed, non-web or host-less input,
/// [`ParseError::UrlTooLong`] for oversized input, and [`ParseError::NotLan`] when
/// `restrict_to_lan` is set and the host is not a local network address.
#[instrument(level = "debug", skip(options), fields(restrict_to_lan = options.restrict_to_lan))]
pub fn classify_with(raw: &str, options: &ClassifyOptions) -> Result<Classification, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::empty());
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(ParseError::too_long(trimmed));
    }

    let candidate: Cow<'_, str> = if has_web_scheme(trimmed) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("{}{trimmed}", options.default_scheme.prefix()))
    };

    let url = Url::parse(&candidate).map_err(|e| ParseError::malformed(&candidate, &e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(ParseError::unsupported_scheme(&candidate, scheme)),
    }

    let Some(host) = url.host() else {
        return Err(ParseError::no_host(&candidate));
    };

    if options.restrict_to_lan && !is_lan_host(&host) {
        return Err(ParseError::not_lan(&candidate, &host.to_string()));
    }

    let kind = if has_image_extension(&url) {
        TargetKind::Single
    } else {
        TargetKind::Page
    };
    debug!(url = %url, ?kind, "classified input");

    Ok(Classification { kind, url })
}

/// Returns the lowercase file extension of the URL's last path segment, if any.
#[must_use]
pub fn path_extension(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let (_, extension) = last.rsplit_once('.')?;
    if extension.is_empty() {
        None
    } else {
        Some(extension.to_ascii_lowercase())
    }
}

/// Returns true if the URL's extension is in [`IMAGE_EXTENSIONS`].
#[must_use]
pub fn has_image_extension(url: &Url) -> bool {
    path_extension(url).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Derives a display name from the last non-empty path segment.
///
/// The segment is percent-decoded; the host is used when the path is empty.
#[must_use]
pub fn file_name_from_url(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()));

    if let Some(segment) = last {
        return urlencoding::decode(segment)
            .map(Cow::into_owned)
            .unwrap_or_else(|e| {
                debug!(segment = %segment, error = %e, "URL decoding failed, using raw segment");
                segment.to_string()
            });
    }

    url.host_str().unwrap_or_default().to_string()
}

fn has_web_scheme(input: &str) -> bool {
    starts_with_ignore_case(input, "http://") || starts_with_ignore_case(input, "https://")
}

fn starts_with_ignore_case(input: &str, prefix: &str) -> bool {
    input
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn is_lan_host(host: &Host<&str>) -> bool {
    match host {
        Host::Ipv4(addr) => addr.is_private(),
        Host::Ipv6(_) => true,
        Host::Domain(_) => false,
    }
}
