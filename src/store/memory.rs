//! Process-local [`Store`] backed by concurrent maps.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use super::{Store, StoreError};
use crate::model::{Collection, CollectionId, Item, ItemId};

/// In-memory store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: DashMap<ItemId, (u64, Arc<Item>)>,
    collections: DashMap<CollectionId, (u64, Arc<Collection>)>,
    collection_urls: DashMap<String, CollectionId>,
    sequence: AtomicU64,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }
}

/// Newest first; insertion order breaks timestamp ties.
fn sort_newest_first<T>(entries: &mut [(DateTime<Utc>, u64, Arc<T>)]) {
    entries.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_item(&self, item: Arc<Item>) -> Result<(), StoreError> {
        debug!(item = %item.id(), "storing item");
        let sequence = self.next_sequence();
        self.items.insert(item.id(), (sequence, item));
        Ok(())
    }

    async fn insert_collection(&self, collection: Arc<Collection>) -> Result<(), StoreError> {
        match self.collection_urls.entry(collection.url().to_string()) {
            Entry::Occupied(entry) => Err(StoreError::duplicate_collection(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(collection = %collection.id(), "storing collection");
                entry.insert(collection.id());
                let sequence = self.next_sequence();
                self.collections
                    .insert(collection.id(), (sequence, collection));
                Ok(())
            }
        }
    }

    async fn delete_item(&self, id: ItemId) -> Result<Option<Arc<Item>>, StoreError> {
        Ok(self.items.remove(&id).map(|(_, (_, item))| item))
    }

    async fn delete_collection(
        &self,
        id: CollectionId,
    ) -> Result<Option<Arc<Collection>>, StoreError> {
        let removed = self.collections.remove(&id).map(|(_, (_, c))| c);
        if let Some(collection) = &removed {
            self.collection_urls.remove(collection.url().as_str());
        }
        Ok(removed)
    }

    async fn items_by_added_desc(&self) -> Result<Vec<Arc<Item>>, StoreError> {
        let mut entries: Vec<_> = self
            .items
            .iter()
            .map(|entry| {
                let (sequence, item) = entry.value();
                (item.added_at(), *sequence, Arc::clone(item))
            })
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries.into_iter().map(|(_, _, item)| item).collect())
    }

    async fn collections_by_added_desc(&self) -> Result<Vec<Arc<Collection>>, StoreError> {
        let mut entries: Vec<_> = self
            .collections
            .iter()
            .map(|entry| {
                let (sequence, collection) = entry.value();
                (collection.added_at(), *sequence, Arc::clone(collection))
            })
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries.into_iter().map(|(_, _, c)| c).collect())
    }
}
