//! A single tracked image and its fetch orchestration.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::id::ItemId;
use crate::download::TransferRegistry;
use crate::parser::file_name_from_url;

/// Bytes of the last successful transfer plus their display size.
#[derive(Debug, Clone)]
struct Payload {
    bytes: Arc<[u8]>,
    size_label: String,
}

/// How the most recent fetch of an item ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum FetchOutcome {
    /// The payload was replaced with `bytes` bytes.
    Stored {
        /// Length of the new payload.
        bytes: usize,
    },
    /// The transfer failed; the previous payload, if any, is untouched.
    Failed,
    /// The transfer was cancelled because the item was deleted.
    Cancelled,
    /// No fetch was pending.
    Idle,
}

/// One fetchable image.
///
/// The payload is absent until the first successful transfer and afterwards
/// always holds exactly the bytes of the most recent successful one.
#[derive(Debug)]
pub struct Item {
    id: ItemId,
    url: Url,
    file_name: String,
    added_at: DateTime<Utc>,
    is_child: bool,
    payload: RwLock<Option<Payload>>,
    fetch_task: Mutex<Option<JoinHandle<FetchOutcome>>>,
}

impl Item {
    /// Creates an item for `url` and immediately starts fetching it.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn create(url: Url, is_child: bool, registry: &TransferRegistry) -> Arc<Self> {
        let item = Arc::new(Self::new(url, is_child));
        item.start_fetch(registry);
        item
    }

    fn new(url: Url, is_child: bool) -> Self {
        Self {
            id: ItemId::new(),
            file_name: file_name_from_url(&url),
            url,
            added_at: Utc::now(),
            is_child,
            payload: RwLock::new(None),
            fetch_task: Mutex::new(None),
        }
    }

    /// Starts a new fetch unless one is already running.
    ///
    /// Returns false, with no effect, when the item's transfer is busy.
    pub fn refetch(self: &Arc<Self>, registry: &TransferRegistry) -> bool {
        self.start_fetch(registry)
    }

    /// Waits for the most recently started fetch to finish.
    ///
    /// Returns [`FetchOutcome::Idle`] if no fetch is pending or another caller
    /// already awaited it.
    pub async fn wait_for_fetch(&self) -> FetchOutcome {
        let task = self.lock_task().take();
        match task {
            Some(task) => task.await.unwrap_or_else(|error| {
                warn!(item = %self.id, %error, "fetch task did not complete");
                FetchOutcome::Failed
            }),
            None => FetchOutcome::Idle,
        }
    }

    #[instrument(skip(self, registry), fields(item = %self.id, url = %self.url))]
    fn start_fetch(self: &Arc<Self>, registry: &TransferRegistry) -> bool {
        let handle = registry.get_or_create(self.id);
        let Some(subscription) = registry.request_transfer(&handle, self.url.clone()) else {
            debug!("fetch already in flight");
            return false;
        };

        let item: Weak<Self> = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            match subscription.finish().await {
                Ok(bytes) => {
                    let len = bytes.len();
                    match item.upgrade() {
                        Some(item) => item.store_payload(bytes),
                        None => debug!("item dropped before its payload arrived"),
                    }
                    FetchOutcome::Stored { bytes: len }
                }
                Err(error) if error.is_cancelled() => FetchOutcome::Cancelled,
                Err(error) => {
                    warn!(%error, "image fetch failed; payload left unchanged");
                    FetchOutcome::Failed
                }
            }
        });

        *self.lock_task() = Some(task);
        true
    }

    fn store_payload(&self, bytes: Vec<u8>) {
        let size_label = format_size(bytes.len());
        info!(item = %self.id, name = %self.file_name, size = %size_label, "payload stored");
        *self.payload.write().unwrap_or_else(PoisonError::into_inner) = Some(Payload {
            bytes: bytes.into(),
            size_label,
        });
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<FetchOutcome>>> {
        self.fetch_task.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the item's identity.
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the absolute source URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the display name derived from the URL.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns when the item was created.
    #[must_use]
    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Returns true if the item belongs to a collection.
    #[must_use]
    pub fn is_child(&self) -> bool {
        self.is_child
    }

    /// Returns the payload bytes, if a fetch has succeeded.
    #[must_use]
    pub fn payload(&self) -> Option<Arc<[u8]>> {
        self.read_payload(|payload| Arc::clone(&payload.bytes))
    }

    /// Returns the human-readable payload size, e.g. `"1.5 KB"`.
    #[must_use]
    pub fn size_label(&self) -> Option<String> {
        self.read_payload(|payload| payload.size_label.clone())
    }

    /// Returns true once a fetch has succeeded.
    #[must_use]
    pub fn has_payload(&self) -> bool {
        self.read_payload(|_| ()).is_some()
    }

    fn read_payload<T>(&self, f: impl FnOnce(&Payload) -> T) -> Option<T> {
        self.payload
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }
}

/// Formats a byte count with binary units: `"512 B"`, `"1.5 KB"`, `"2.0 MB"`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn format_size(bytes: usize) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", size as u64, UNITS[unit])
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
