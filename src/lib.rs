//! ftcr Core Library
//!
//! Collects images referenced by URLs. A URL either names one image or a page
//! whose markup links to many; pages are scraped and every discovered image is
//! fetched concurrently with live byte, percentage and throughput telemetry.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Classifies raw input as a single image or a page
//! - [`scrape`] - Fetches pages and extracts image links
//! - [`download`] - Streaming transfers and the identity-keyed transfer registry
//! - [`model`] - Item and collection aggregates with create/refetch
//! - [`store`] - Storage seam for items and collections
//! - [`library`] - Orchestration tying the above together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod library;
pub mod model;
pub mod parser;
pub mod scrape;
pub mod store;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::ClientConfig;
pub use download::{
    DownloadError, HttpClient, ProgressSnapshot, TransferEvent, TransferHandle, TransferRegistry,
    TransferSubscription, Transport,
};
pub use library::{Added, Library, LibraryError};
pub use model::{Collection, CollectionId, FetchOutcome, Item, ItemId, RefetchOutcome};
pub use parser::{Classification, ParseError, Scheme, TargetKind, classify, classify_with};
pub use scrape::{PageScraper, ScrapeError, extract_image_urls};
pub use store::{InMemoryStore, Store, StoreError};
