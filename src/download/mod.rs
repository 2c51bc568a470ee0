//! Streaming image transfers with live progress.
//!
//! This module owns everything between "fetch this URL" and "here are the bytes":
//!
//! - [`Transport`]: the GET seam, implemented by [`HttpClient`] over reqwest
//! - [`TransferHandle`]: per-item live state (busy flag, byte counts, throughput)
//! - [`TransferRegistry`]: identity-keyed handles shared by every observer
//! - the transfer engine, which streams one body and emits [`TransferEvent`]s
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ftcr_core::download::{HttpClient, TransferRegistry};
//! use ftcr_core::model::ItemId;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = TransferRegistry::new(Arc::new(HttpClient::new()));
//! let handle = registry.get_or_create(ItemId::new());
//! if let Some(subscription) =
//!     registry.request_transfer(&handle, Url::parse("https://example.com/photo.jpg")?)
//! {
//!     let bytes = subscription.finish().await?;
//!     println!("{} bytes", bytes.len());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod handle;
mod registry;
mod throughput;
mod transfer;
mod transport;

pub use client::HttpClient;
pub use constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, THROUGHPUT_SAMPLE_INTERVAL};
pub use error::DownloadError;
pub use handle::{ProgressSnapshot, TransferHandle};
pub use registry::TransferRegistry;
pub use throughput::ThroughputMeter;
pub use transfer::{TransferEvent, TransferSubscription};
pub use transport::{BodyStream, Transport, TransportResponse, body_from_bytes};
