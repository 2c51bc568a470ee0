//! Image link extraction from page text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace, warn};
use url::Url;

use super::entities::decode_entities;
use crate::parser::IMAGE_EXTENSIONS;

/// Matches `<a ... href="...ext">` and `<img ... src="...ext">`, either quote style.
///
/// Vector images are excluded here even though a typed `.svg` URL is a single image.
#[allow(clippy::expect_used)]
static IMAGE_LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let extensions = IMAGE_EXTENSIONS
        .iter()
        .filter(|ext| **ext != "svg")
        .copied()
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(
        r#"(?i)<(?:a\b[^>]*?\shref|img\b[^>]*?\ssrc)\s*=\s*(?:"([^"<>]*?\.(?:{extensions}))"|'([^'<>]*?\.(?:{extensions}))')"#
    );
    Regex::new(&pattern).expect("image link regex is valid") // Static pattern, safe to panic
});

/// Extracts absolute image URLs from `text`, in document order.
///
/// Entities are decoded first. Each captured path is resolved against `base`;
/// captures that do not resolve to an http(s) URL are skipped. Duplicates are
/// kept.
#[must_use]
pub fn extract_image_urls(text: &str, base: &Url) -> Vec<Url> {
    let decoded = decode_entities(text);

    let urls: Vec<Url> = IMAGE_LINK_PATTERN
        .captures_iter(&decoded)
        .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
        .filter_map(|capture| resolve(capture.as_str(), base))
        .collect();

    debug!(base = %base, count = urls.len(), "extracted image links");
    urls
}

fn resolve(path: &str, base: &Url) -> Option<Url> {
    match base.join(path) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            trace!(capture = path, resolved = %url, "image link");
            Some(url)
        }
        Ok(url) => {
            warn!(capture = path, scheme = url.scheme(), "skipping non-http image link");
            None
        }
        Err(error) => {
            warn!(capture = path, %error, "skipping unresolvable image link");
            None
        }
    }
}
