//! Process-wide mapping from item identity to transfer handle.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, instrument};
use url::Url;

use super::constants::PROGRESS_CHANNEL_CAPACITY;
use super::handle::{ProgressSnapshot, TransferHandle};
use super::transfer::{TransferSubscription, run_transfer};
use super::transport::Transport;
use crate::model::ItemId;

/// Registry of transfer handles keyed by item identity.
///
/// Looking up the same identity twice yields the same handle, so a UI row can
/// re-attach to an item's transfer at any time. Entries live until they are
/// removed explicitly; removal cancels whatever transfer is running.
#[derive(Debug)]
pub struct TransferRegistry {
    transport: Arc<dyn Transport>,
    handles: DashMap<ItemId, Arc<TransferHandle>>,
}

impl TransferRegistry {
    /// Creates an empty registry whose transfers go through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            handles: DashMap::new(),
        }
    }

    /// Returns the shared transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Returns the handle for `id`, creating it on first use.
    pub fn get_or_create(&self, id: ItemId) -> Arc<TransferHandle> {
        self.handles
            .entry(id)
            .or_insert_with(|| Arc::new(TransferHandle::new(id)))
            .clone()
    }

    /// Returns the handle for `id` if one is registered.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<Arc<TransferHandle>> {
        self.handles.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the live state for `id` if one is registered.
    #[must_use]
    pub fn snapshot(&self, id: ItemId) -> Option<ProgressSnapshot> {
        self.get(id).map(|handle| handle.snapshot())
    }

    /// Starts a transfer of `url` on `handle`.
    ///
    /// Returns `None` without touching the handle if it is already busy.
    /// Must be called from within a Tokio runtime.
    #[instrument(skip_all, fields(item = %handle.id(), url = %url))]
    pub fn request_transfer(
        &self,
        handle: &Arc<TransferHandle>,
        url: Url,
    ) -> Option<TransferSubscription> {
        let Some(cancel) = handle.try_begin() else {
            debug!("transfer already in flight, request ignored");
            return None;
        };

        let (tx, rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        tokio::spawn(run_transfer(
            Arc::clone(&self.transport),
            Arc::clone(handle),
            url.clone(),
            cancel,
            tx,
        ));
        Some(TransferSubscription::new(url, rx))
    }

    /// Drops the entry for `id`, cancelling its transfer. Returns false if absent.
    pub fn remove(&self, id: ItemId) -> bool {
        match self.handles.remove(&id) {
            Some((_, handle)) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Drops every entry, cancelling all transfers.
    pub fn clear(&self) {
        for entry in self.handles.iter() {
            entry.value().cancel();
        }
        self.handles.clear();
    }

    /// Number of registered handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True when no handles are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::transport::ScriptedTransport;

    fn registry() -> (Arc<ScriptedTransport>, TransferRegistry) {
        let transport = Arc::new(ScriptedTransport::new());
        let registry = TransferRegistry::new(transport.clone());
        (transport, registry)
    }

    #[test]
    fn test_get_or_create_returns_same_handle() {
        let (_transport, registry) = registry();
        let id = ItemId::new();

        let first = registry.get_or_create(id);
        let second = registry.get_or_create(id);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_ids_get_distinct_handles() {
        let (_transport, registry) = registry();
        let a = registry.get_or_create(ItemId::new());
        let b = registry.get_or_create(ItemId::new());
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_remove_then_create_yields_fresh_handle() {
        let (_transport, registry) = registry();
        let id = ItemId::new();
        let first = registry.get_or_create(id);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.get(id).is_none());

        let second = registry.get_or_create(id);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_request_on_busy_handle_is_noop() {
        let (transport, registry) = registry();
        let body = transport.script("https://h/a.png", 200, Some(3));
        let handle = registry.get_or_create(ItemId::new());
        let url = Url::parse("https://h/a.png").unwrap();

        let subscription = registry.request_transfer(&handle, url.clone()).unwrap();
        assert!(registry.request_transfer(&handle, url).is_none());

        body.send_chunk(b"abc").await;
        body.finish();
        assert_eq!(subscription.finish().await.unwrap(), b"abc");
        assert_eq!(transport.get_count("https://h/a.png"), 1);
    }

    #[tokio::test]
    async fn test_remove_cancels_in_flight_transfer() {
        let (transport, registry) = registry();
        let body = transport.script("https://h/a.png", 200, None);
        let id = ItemId::new();
        let handle = registry.get_or_create(id);

        let subscription = registry
            .request_transfer(&handle, Url::parse("https://h/a.png").unwrap())
            .unwrap();
        assert!(registry.remove(id));
        body.send_chunk(b"late").await;

        assert!(subscription.finish().await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_clear_cancels_everything() {
        let (transport, registry) = registry();
        let body_a = transport.script("https://h/a.png", 200, None);
        let body_b = transport.script("https://h/b.png", 200, None);

        let a = registry.get_or_create(ItemId::new());
        let b = registry.get_or_create(ItemId::new());
        let sub_a = registry
            .request_transfer(&a, Url::parse("https://h/a.png").unwrap())
            .unwrap();
        let sub_b = registry
            .request_transfer(&b, Url::parse("https://h/b.png").unwrap())
            .unwrap();

        registry.clear();
        assert!(registry.is_empty());
        body_a.send_chunk(b"x").await;
        body_b.send_chunk(b"y").await;

        assert!(sub_a.finish().await.unwrap_err().is_cancelled());
        assert!(sub_b.finish().await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_snapshot_reflects_handle_state() {
        let (transport, registry) = registry();
        let body = transport.script("https://h/a.png", 200, Some(4));
        let id = ItemId::new();
        let handle = registry.get_or_create(id);
        assert!(registry.snapshot(ItemId::new()).is_none());

        let subscription = registry
            .request_transfer(&handle, Url::parse("https://h/a.png").unwrap())
            .unwrap();
        body.send_chunk(b"abcd").await;
        body.finish();
        subscription.finish().await.unwrap();

        let snapshot = registry.snapshot(id).unwrap();
        assert!(!snapshot.busy);
        assert_eq!(snapshot.received_bytes, 4);
    }
}
