//! Page scraping: fetch a document and list the images it references.
//!
//! Two markup dialects are recognized in one pass, link style
//! (`<a href="photo.jpg">`) and embed style (`<img src="photo.jpg">`).
//! Matching is a regular expression over entity-decoded text, not an HTML parse.
//!
//! # Example
//!
//! ```
//! use ftcr_core::scrape::extract_image_urls;
//! use url::Url;
//!
//! let base = Url::parse("http://h/p/").unwrap();
//! let urls = extract_image_urls(r#"<a href="/img/a.jpg">x</a><img src="b.png">"#, &base);
//! assert_eq!(urls[0].as_str(), "http://h/img/a.jpg");
//! assert_eq!(urls[1].as_str(), "http://h/p/b.png");
//! ```

mod entities;
mod error;
mod extract;
mod page;

pub use entities::decode_entities;
pub use error::ScrapeError;
pub use extract::extract_image_urls;
pub use page::PageScraper;
