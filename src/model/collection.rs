//! A scraped page and the images it owns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, instrument};
use url::Url;

use super::id::{CollectionId, ItemId};
use super::item::{FetchOutcome, Item};
use crate::download::TransferRegistry;
use crate::scrape::{PageScraper, ScrapeError};

/// Result of re-scraping a collection's page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RefetchOutcome {
    /// The member list was replaced with `count` new items.
    Replaced {
        /// Number of new members.
        count: usize,
    },
    /// The page listed no images; the existing members were kept.
    Unchanged,
    /// The collection was released while the page loaded; nothing was installed.
    Released,
}

/// A page plus the ordered images discovered on it.
///
/// Members are owned exclusively: they are created here, always flagged as
/// children, and go away with the collection.
#[derive(Debug)]
pub struct Collection {
    id: CollectionId,
    url: Url,
    added_at: DateTime<Utc>,
    members: RwLock<Vec<Arc<Item>>>,
    released: AtomicBool,
}

impl Collection {
    /// Scrapes `url` and creates one child item per discovered image.
    ///
    /// Nothing is created if the scrape fails. Member fetches start
    /// concurrently before this returns.
    ///
    /// # Errors
    ///
    /// Returns the [`ScrapeError`] from fetching the page.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn create(
        url: Url,
        scraper: &PageScraper,
        registry: &TransferRegistry,
    ) -> Result<Arc<Self>, ScrapeError> {
        let image_urls = scraper.scrape(&url).await?;
        let members = spawn_members(image_urls, registry);
        info!(members = members.len(), "collection created");

        Ok(Arc::new(Self {
            id: CollectionId::new(),
            url,
            added_at: Utc::now(),
            members: RwLock::new(members),
            released: AtomicBool::new(false),
        }))
    }

    /// Re-scrapes the page and swaps in a fresh member list.
    ///
    /// An empty scrape keeps the current members. Replaced members have their
    /// transfers cancelled and their registry entries released. If the
    /// collection is released before the page arrives, the fresh members are
    /// discarded and [`RefetchOutcome::Released`] is returned.
    ///
    /// # Errors
    ///
    /// Returns the [`ScrapeError`] from fetching the page; members are untouched.
    #[instrument(skip(self, scraper, registry), fields(collection = %self.id, url = %self.url))]
    pub async fn refetch(
        &self,
        scraper: &PageScraper,
        registry: &TransferRegistry,
    ) -> Result<RefetchOutcome, ScrapeError> {
        let image_urls = scraper.scrape(&self.url).await?;
        if image_urls.is_empty() {
            info!("page listed no images, keeping existing members");
            return Ok(RefetchOutcome::Unchanged);
        }

        if self.is_released() {
            debug!("collection released during scrape, discarding result");
            return Ok(RefetchOutcome::Released);
        }

        let fresh = spawn_members(image_urls, registry);
        let count = fresh.len();
        let previous = {
            // `release` sets the flag before reading members, so one side sees the other.
            let mut members = self.write_members();
            if self.is_released() {
                drop(members);
                for item in &fresh {
                    registry.remove(item.id());
                }
                debug!("collection released during scrape, discarding result");
                return Ok(RefetchOutcome::Released);
            }
            std::mem::replace(&mut *members, fresh)
        };
        for item in &previous {
            registry.remove(item.id());
        }

        info!(replaced = previous.len(), members = count, "members replaced");
        Ok(RefetchOutcome::Replaced { count })
    }

    /// Detaches one member. Returns it, or `None` if it is not a member.
    pub fn remove_member(&self, id: ItemId) -> Option<Arc<Item>> {
        let mut members = self.write_members();
        let index = members.iter().position(|item| item.id() == id)?;
        Some(members.remove(index))
    }

    /// Releases every member's registry entry, cancelling in-flight fetches.
    ///
    /// A refetch still in flight will not install new members afterwards.
    pub fn release(&self, registry: &TransferRegistry) {
        self.released.store(true, Ordering::SeqCst);
        for item in self.members() {
            registry.remove(item.id());
        }
    }

    /// Waits for every member's pending fetch.
    pub async fn wait_for_fetches(&self) -> Vec<FetchOutcome> {
        let members = self.members();
        join_all(members.iter().map(|item| item.wait_for_fetch())).await
    }

    /// Returns true once [`release`](Self::release) has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Returns the collection's identity.
    #[must_use]
    pub fn id(&self) -> CollectionId {
        self.id
    }

    /// Returns the page URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns when the collection was created.
    #[must_use]
    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Returns the members in document order.
    #[must_use]
    pub fn members(&self) -> Vec<Arc<Item>> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn write_members(&self) -> RwLockWriteGuard<'_, Vec<Arc<Item>>> {
        self.members.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn spawn_members(urls: Vec<Url>, registry: &TransferRegistry) -> Vec<Arc<Item>> {
    urls.into_iter()
        .map(|url| Item::create(url, true, registry))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::download::DownloadError;
    use crate::test_support::transport::ScriptedTransport;

    const PAGE: &str = "https://cdn.example.com/gallery";

    fn setup() -> (Arc<ScriptedTransport>, PageScraper, TransferRegistry) {
        let transport = Arc::new(ScriptedTransport::new());
        let scraper = PageScraper::new(transport.clone());
        let registry = TransferRegistry::new(transport.clone());
        (transport, scraper, registry)
    }

    fn names(collection: &Collection) -> Vec<String> {
        collection
            .members()
            .iter()
            .map(|item| item.url().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_create_builds_children_in_document_order() {
        let (transport, scraper, registry) = setup();
        transport.respond(PAGE, 200, br#"<img src="b.png"><img src="a.png">"#);
        transport.respond("https://cdn.example.com/b.png", 200, b"bb");
        transport.respond("https://cdn.example.com/a.png", 200, b"a");

        let collection = Collection::create(Url::parse(PAGE).unwrap(), &scraper, &registry)
            .await
            .unwrap();

        assert_eq!(
            names(&collection),
            vec!["https://cdn.example.com/b.png", "https://cdn.example.com/a.png"]
        );
        assert!(collection.members().iter().all(|item| item.is_child()));

        let outcomes = collection.wait_for_fetches().await;
        assert_eq!(
            outcomes,
            vec![FetchOutcome::Stored { bytes: 2 }, FetchOutcome::Stored { bytes: 1 }]
        );
    }

    #[tokio::test]
    async fn test_create_fails_whole_on_scrape_error() {
        let (transport, scraper, registry) = setup();
        transport.fail(PAGE, DownloadError::timeout(PAGE));

        let result = Collection::create(Url::parse(PAGE).unwrap(), &scraper, &registry).await;
        assert!(matches!(result, Err(ScrapeError::Fetch(_))));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_refetch_on_empty_page_keeps_members() {
        let (transport, scraper, registry) = setup();
        transport.respond(PAGE, 200, br#"<img src="a.png">"#);
        transport.respond(PAGE, 200, b"<html>nothing here</html>");

        let collection = Collection::create(Url::parse(PAGE).unwrap(), &scraper, &registry)
            .await
            .unwrap();
        let before: Vec<ItemId> = collection.members().iter().map(|i| i.id()).collect();

        let outcome = collection.refetch(&scraper, &registry).await.unwrap();
        assert_eq!(outcome, RefetchOutcome::Unchanged);
        let after: Vec<ItemId> = collection.members().iter().map(|i| i.id()).collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_refetch_failure_keeps_members() {
        let (transport, scraper, registry) = setup();
        transport.respond(PAGE, 200, br#"<img src="a.png">"#);
        transport.respond(PAGE, 503, b"");

        let collection = Collection::create(Url::parse(PAGE).unwrap(), &scraper, &registry)
            .await
            .unwrap();

        let result = collection.refetch(&scraper, &registry).await;
        assert!(result.is_err());
        assert_eq!(collection.member_count(), 1);
    }

    #[tokio::test]
    async fn test_refetch_replaces_members_and_releases_old_entries() {
        let (transport, scraper, registry) = setup();
        transport.respond(PAGE, 200, br#"<img src="a.png">"#);
        transport.respond(PAGE, 200, br#"<img src="x.png"><img src="y.png">"#);

        let collection = Collection::create(Url::parse(PAGE).unwrap(), &scraper, &registry)
            .await
            .unwrap();
        let old_id = collection.members()[0].id();
        collection.wait_for_fetches().await;

        let outcome = collection.refetch(&scraper, &registry).await.unwrap();
        assert_eq!(outcome, RefetchOutcome::Replaced { count: 2 });
        assert_eq!(
            names(&collection),
            vec!["https://cdn.example.com/x.png", "https://cdn.example.com/y.png"]
        );
        assert!(registry.get(old_id).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_refetch_racing_release_installs_nothing() {
        let (transport, scraper, registry) = setup();
        transport.respond(PAGE, 200, br#"<img src="a.png">"#);
        let page = transport.script(PAGE, 200, None);

        let collection = Collection::create(Url::parse(PAGE).unwrap(), &scraper, &registry)
            .await
            .unwrap();
        let original = collection.members()[0].id();

        let (outcome, ()) = tokio::join!(collection.refetch(&scraper, &registry), async {
            while transport.get_count(PAGE) < 2 {
                tokio::task::yield_now().await;
            }
            collection.release(&registry);
            assert!(registry.is_empty());
            page.send_chunk(br#"<img src="x.png"><img src="y.png">"#).await;
            page.finish();
        });

        assert_eq!(outcome.unwrap(), RefetchOutcome::Released);
        assert!(registry.is_empty());
        assert_eq!(collection.member_count(), 1);
        assert_eq!(collection.members()[0].id(), original);
        assert_eq!(transport.get_count("https://cdn.example.com/x.png"), 0);
    }

    #[tokio::test]
    async fn test_remove_member() {
        let (transport, scraper, registry) = setup();
        transport.respond(PAGE, 200, br#"<img src="a.png"><img src="b.png">"#);

        let collection = Collection::create(Url::parse(PAGE).unwrap(), &scraper, &registry)
            .await
            .unwrap();
        let first = collection.members()[0].id();

        assert!(collection.remove_member(first).is_some());
        assert!(collection.remove_member(first).is_none());
        assert_eq!(names(&collection), vec!["https://cdn.example.com/b.png"]);
    }
}
