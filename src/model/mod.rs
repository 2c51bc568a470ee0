//! Domain aggregates: standalone images and scraped collections.
//!
//! Both aggregates drive their fetches through a shared
//! [`TransferRegistry`](crate::download::TransferRegistry), keyed by [`ItemId`].

mod collection;
mod id;
mod item;

pub use collection::{Collection, RefetchOutcome};
pub use id::{CollectionId, ItemId};
pub use item::{FetchOutcome, Item, format_size};
