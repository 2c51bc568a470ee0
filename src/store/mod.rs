//! Persistence seam for tracked items and collections.
//!
//! The core only needs insert, delete, and "everything, newest first" for each
//! entity set. Collections own their members, so deleting a collection deletes
//! its items with it; only standalone items are stored on their own.

mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Collection, CollectionId, Item, ItemId};

pub use memory::InMemoryStore;

/// Errors reported by a [`Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A collection for this page URL already exists.
    #[error("a collection for {url} already exists")]
    DuplicateCollection {
        /// The page URL.
        url: String,
    },

    /// The backing store could not be reached.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Why the operation failed.
        reason: String,
    },
}

impl StoreError {
    /// Creates a duplicate collection error.
    pub fn duplicate_collection(url: impl Into<String>) -> Self {
        Self::DuplicateCollection { url: url.into() }
    }

    /// Creates an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Storage for standalone items and collections.
///
/// Each call is atomic on its own; no transactions span calls.
#[async_trait]
pub trait Store: Send + Sync + fmt::Debug {
    /// Stores a standalone item.
    async fn insert_item(&self, item: Arc<Item>) -> Result<(), StoreError>;

    /// Stores a collection. Fails if one with the same URL exists.
    async fn insert_collection(&self, collection: Arc<Collection>) -> Result<(), StoreError>;

    /// Deletes a standalone item, returning it if it was stored.
    async fn delete_item(&self, id: ItemId) -> Result<Option<Arc<Item>>, StoreError>;

    /// Deletes a collection and, with it, its members.
    async fn delete_collection(
        &self,
        id: CollectionId,
    ) -> Result<Option<Arc<Collection>>, StoreError>;

    /// Returns all standalone items, newest first.
    async fn items_by_added_desc(&self) -> Result<Vec<Arc<Item>>, StoreError>;

    /// Returns all collections, newest first.
    async fn collections_by_added_desc(&self) -> Result<Vec<Arc<Collection>>, StoreError>;
}
