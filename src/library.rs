//! Top-level orchestration: classify input, build aggregates, keep the store in sync.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::download::{HttpClient, TransferRegistry, Transport};
use crate::model::{Collection, CollectionId, Item, ItemId, RefetchOutcome};
use crate::parser::{ParseError, TargetKind, classify_with};
use crate::scrape::{PageScraper, ScrapeError};
use crate::store::{InMemoryStore, Store, StoreError};

/// Errors surfaced to the caller of a [`Library`] operation.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The input could not be classified.
    #[error(transparent)]
    InvalidUrl(#[from] ParseError),

    /// The page could not be scraped; no collection was created.
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What [`Library::add`] created.
#[derive(Debug, Clone)]
pub enum Added {
    /// A standalone image; its fetch is already running.
    Item(Arc<Item>),
    /// A scraped page; member fetches are already running.
    Collection(Arc<Collection>),
}

/// Image library: the entry point for adding, refreshing and deleting images.
///
/// # Example
///
/// ```no_run
/// use ftcr_core::{Added, ClientConfig, Library};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let library = Library::new(ClientConfig::default());
/// match library.add("cdn.example.com/photo.jpg").await? {
///     Added::Item(item) => println!("{:?}", item.wait_for_fetch().await),
///     Added::Collection(collection) => println!("{} images", collection.member_count()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Library {
    config: ClientConfig,
    scraper: PageScraper,
    registry: Arc<TransferRegistry>,
    store: Arc<dyn Store>,
}

impl Library {
    /// Creates a library over HTTP with an in-memory store.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(HttpClient::from_config(&config));
        Self::with_parts(config, transport, Arc::new(InMemoryStore::new()))
    }

    /// Creates a library over the given transport and store.
    #[must_use]
    pub fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            config,
            scraper: PageScraper::new(Arc::clone(&transport)),
            registry: Arc::new(TransferRegistry::new(transport)),
            store,
        }
    }

    /// Returns the configuration in effect.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the registry, for observing live transfer state.
    #[must_use]
    pub fn registry(&self) -> &Arc<TransferRegistry> {
        &self.registry
    }

    /// Classifies `raw` and adds either one image or a scraped collection.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::InvalidUrl`] if `raw` is not a usable URL
    /// - [`LibraryError::Scrape`] if a page could not be fetched
    /// - [`LibraryError::Store`] if a collection for the page already exists
    #[instrument(skip(self))]
    pub async fn add(&self, raw: &str) -> Result<Added, LibraryError> {
        let target = classify_with(raw, &self.config.classify_options())?;

        match target.kind {
            TargetKind::Single => {
                let item = Item::create(target.url, false, &self.registry);
                if let Err(error) = self.store.insert_item(Arc::clone(&item)).await {
                    self.registry.remove(item.id());
                    return Err(error.into());
                }
                info!(item = %item.id(), name = item.file_name(), "image added");
                Ok(Added::Item(item))
            }
            TargetKind::Page => {
                self.ensure_new_collection(&target.url).await?;
                let collection =
                    Collection::create(target.url, &self.scraper, &self.registry).await?;
                if let Err(error) = self.store.insert_collection(Arc::clone(&collection)).await {
                    collection.release(&self.registry);
                    return Err(error.into());
                }
                info!(
                    collection = %collection.id(),
                    members = collection.member_count(),
                    "collection added"
                );
                Ok(Added::Collection(collection))
            }
        }
    }

    async fn ensure_new_collection(&self, url: &url::Url) -> Result<(), StoreError> {
        let existing = self.store.collections_by_added_desc().await?;
        if existing.iter().any(|collection| collection.url() == url) {
            return Err(StoreError::duplicate_collection(url.as_str()));
        }
        Ok(())
    }

    /// Deletes a standalone item and cancels its fetch. Returns false if unknown.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Store`] if the store fails.
    pub async fn delete_item(&self, id: ItemId) -> Result<bool, LibraryError> {
        // Collection members are not in the store; their entries stay put.
        if self.store.delete_item(id).await?.is_none() {
            debug!(item = %id, "no standalone item to delete");
            return Ok(false);
        }
        self.registry.remove(id);
        debug!(item = %id, "item deleted");
        Ok(true)
    }

    /// Deletes a collection with all its members. Returns false if unknown.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Store`] if the store fails.
    pub async fn delete_collection(&self, id: CollectionId) -> Result<bool, LibraryError> {
        let Some(collection) = self.store.delete_collection(id).await? else {
            return Ok(false);
        };
        collection.release(&self.registry);
        debug!(collection = %id, "collection deleted");
        Ok(true)
    }

    /// Deletes one member of a collection. Returns false if either is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Store`] if the store fails.
    pub async fn delete_member(
        &self,
        collection: CollectionId,
        item: ItemId,
    ) -> Result<bool, LibraryError> {
        let Some(owner) = self.find_collection(collection).await? else {
            return Ok(false);
        };
        if owner.remove_member(item).is_none() {
            return Ok(false);
        }
        self.registry.remove(item);
        Ok(true)
    }

    /// Deletes everything and clears the registry.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Store`] if the store fails.
    pub async fn delete_all(&self) -> Result<(), LibraryError> {
        for item in self.store.items_by_added_desc().await? {
            self.store.delete_item(item.id()).await?;
        }
        for collection in self.store.collections_by_added_desc().await? {
            self.store.delete_collection(collection.id()).await?;
            collection.release(&self.registry);
        }
        self.registry.clear();
        info!("library cleared");
        Ok(())
    }

    /// Re-fetches every standalone item and every collection member.
    ///
    /// Pages are not re-scraped. Items already fetching are skipped. Returns
    /// the number of transfers started.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Store`] if the store fails.
    pub async fn refetch_all(&self) -> Result<usize, LibraryError> {
        let mut started = 0;
        for item in self.store.items_by_added_desc().await? {
            started += usize::from(item.refetch(&self.registry));
        }
        for collection in self.store.collections_by_added_desc().await? {
            for member in collection.members() {
                started += usize::from(member.refetch(&self.registry));
            }
        }
        info!(started, "refetch requested");
        Ok(started)
    }

    /// Re-scrapes one collection's page. Returns `None` if the collection is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Scrape`] if the page could not be fetched (the
    /// members are kept), or [`LibraryError::Store`] if the store fails.
    pub async fn refetch_collection(
        &self,
        id: CollectionId,
    ) -> Result<Option<RefetchOutcome>, LibraryError> {
        let Some(collection) = self.find_collection(id).await? else {
            return Ok(None);
        };
        let outcome = collection.refetch(&self.scraper, &self.registry).await?;
        Ok(Some(outcome))
    }

    /// Standalone items, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Store`] if the store fails.
    pub async fn items(&self) -> Result<Vec<Arc<Item>>, LibraryError> {
        Ok(self.store.items_by_added_desc().await?)
    }

    /// Collections, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Store`] if the store fails.
    pub async fn collections(&self) -> Result<Vec<Arc<Collection>>, LibraryError> {
        Ok(self.store.collections_by_added_desc().await?)
    }

    async fn find_collection(
        &self,
        id: CollectionId,
    ) -> Result<Option<Arc<Collection>>, StoreError> {
        Ok(self
            .store
            .collections_by_added_desc()
            .await?
            .into_iter()
            .find(|collection| collection.id() == id))
    }
}
