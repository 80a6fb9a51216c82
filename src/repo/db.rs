//! Durable-store-backed paging engine
//!
//! Persists every fetched page and serves the stored order back to the
//! consumer. A boundary trigger near the end of the stored items grows the
//! store by one page; `refresh` clears the collection and reinserts the
//! freshest first page in a single transaction. The store's invalidation
//! signal drives re-delivery to the consumer, so the engine never pushes
//! items itself.

use super::PostRepository;
use crate::error::{Error, Result};
use crate::listing::{Listing, ListingControl, PostFeed};
use crate::source::PostSource;
use crate::state::NetworkStateCell;
use crate::store::PostStore;
use crate::types::{Page, PageDirection, Post};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Repository that pages a durable store against a remote source
pub struct DbPostRepository {
    source: Arc<dyn PostSource>,
    store: Arc<dyn PostStore>,
    network_page_size: Option<u32>,
    /// Generation of the most recently opened listing. Results of fetches
    /// dispatched for older listings are dropped instead of applied.
    live_generation: Arc<AtomicU64>,
}

impl DbPostRepository {
    /// Create a repository over the given source and store
    pub fn new(source: Arc<dyn PostSource>, store: Arc<dyn PostStore>) -> Self {
        Self {
            source,
            store,
            network_page_size: None,
            live_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Override the page size used for remote fetches
    ///
    /// By default remote fetches use the page size the listing was opened
    /// with.
    #[must_use]
    pub fn with_network_page_size(mut self, page_size: u32) -> Self {
        self.network_page_size = Some(page_size);
        self
    }
}

impl PostRepository for DbPostRepository {
    fn open(&self, collection: &str, page_size: u32) -> Listing {
        // Opening a listing supersedes any previously opened one.
        let generation = self.live_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let boundary = Arc::new(StoreBoundary {
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
            collection: collection.to_string(),
            page_size: self.network_page_size.unwrap_or(page_size.max(1)),
            network_state: NetworkStateCell::new(),
            refresh_state: NetworkStateCell::new(),
            in_flight: AtomicBool::new(false),
            refresh_in_flight: AtomicBool::new(false),
            can_retry: AtomicBool::new(false),
            live_generation: Arc::clone(&self.live_generation),
            generation,
        });

        // Nothing stored yet: kick off the first page without waiting for a
        // boundary signal.
        match self.store.read_ordered(collection) {
            Ok(posts) if posts.is_empty() => boundary.fetch_next_page(),
            Ok(_) => {}
            Err(e) => warn!(collection, error = %e, "initial store read failed"),
        }

        Listing::new(
            PostFeed::stored(Arc::clone(&self.store), collection),
            boundary.network_state.watch(),
            boundary.refresh_state.watch(),
            Arc::new(Arc::clone(&boundary)),
        )
    }
}

/// Boundary-fetch state for one opened listing
///
/// Owns the single-flight guards and the two tracked state slots. All
/// boundary fetches share one slot; refresh has its own so a full-screen
/// refresh indicator and a footer loading indicator never conflict.
struct StoreBoundary {
    source: Arc<dyn PostSource>,
    store: Arc<dyn PostStore>,
    collection: String,
    page_size: u32,
    network_state: NetworkStateCell,
    refresh_state: NetworkStateCell,
    in_flight: AtomicBool,
    refresh_in_flight: AtomicBool,
    can_retry: AtomicBool,
    live_generation: Arc<AtomicU64>,
    generation: u64,
}

impl StoreBoundary {
    fn is_stale(&self) -> bool {
        self.live_generation.load(Ordering::SeqCst) != self.generation
    }

    /// Dispatch a fetch for the next stored page, if none is in flight
    fn fetch_next_page(self: &Arc<Self>) {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.network_state.start();

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let result = this.source.fetch_top(&this.collection, this.page_size).await;
            if this.is_stale() {
                debug!(collection = %this.collection, "dropping stale page fetch");
                return;
            }
            match result {
                Ok(page) => match this.append_page(page).await {
                    Ok(count) => {
                        this.can_retry.store(false, Ordering::SeqCst);
                        this.in_flight.store(false, Ordering::SeqCst);
                        this.network_state.succeed();
                        debug!(collection = %this.collection, count, "appended page");
                    }
                    // Store failures are not recorded for retry: re-running a
                    // local transaction without a fresh fetch can mask data
                    // loss.
                    Err(e) => {
                        this.in_flight.store(false, Ordering::SeqCst);
                        this.network_state.fail(e.to_string());
                    }
                },
                Err(e) => {
                    this.can_retry.store(true, Ordering::SeqCst);
                    this.in_flight.store(false, Ordering::SeqCst);
                    this.network_state.fail(e.to_string());
                }
            }
        });
    }

    /// Insert a page transactionally, assigning contiguous positions
    async fn append_page(&self, page: Page) -> Result<usize> {
        let store = Arc::clone(&self.store);
        let collection = self.collection.clone();
        let posts = page.posts;
        let count = posts.len();

        tokio::task::spawn_blocking(move || {
            store.run_atomically(&mut |tx| {
                let start = tx.next_position(&collection)?;
                let batch: Vec<Post> = posts
                    .iter()
                    .cloned()
                    .enumerate()
                    .map(|(index, mut post)| {
                        post.position = start + index as u64;
                        post.collection = collection.clone();
                        post
                    })
                    .collect();
                tx.insert(batch)
            })
        })
        .await
        .map_err(|e| Error::store(format!("store task failed: {e}")))??;

        Ok(count)
    }

    /// Fetch the first page and atomically replace the stored collection
    fn refresh(self: &Arc<Self>) {
        if self
            .refresh_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.refresh_state.start();

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let result = this.source.fetch_top(&this.collection, this.page_size).await;
            if this.is_stale() {
                debug!(collection = %this.collection, "dropping stale refresh");
                return;
            }
            let settled = match result {
                Ok(page) => this.replace_all(page).await,
                Err(e) => Err(e),
            };
            this.refresh_in_flight.store(false, Ordering::SeqCst);
            match settled {
                Ok(count) => {
                    this.refresh_state.succeed();
                    debug!(collection = %this.collection, count, "refreshed collection");
                }
                Err(e) => this.refresh_state.fail(e.to_string()),
            }
        });
    }

    /// Delete-all plus reinsert-from-zero as one transaction
    ///
    /// Discards any tail pages fetched since the first: the visible sequence
    /// afterwards exactly matches the freshest remote order.
    async fn replace_all(&self, page: Page) -> Result<usize> {
        let store = Arc::clone(&self.store);
        let collection = self.collection.clone();
        let posts = page.posts;
        let count = posts.len();

        tokio::task::spawn_blocking(move || {
            store.run_atomically(&mut |tx| {
                tx.delete_all(&collection)?;
                let batch: Vec<Post> = posts
                    .iter()
                    .cloned()
                    .enumerate()
                    .map(|(index, mut post)| {
                        post.position = index as u64;
                        post.collection = collection.clone();
                        post
                    })
                    .collect();
                tx.insert(batch)
            })
        })
        .await
        .map_err(|e| Error::store(format!("store task failed: {e}")))??;

        Ok(count)
    }

    /// Re-issue the last failed boundary fetch
    ///
    /// The durable strategy's fetch parameters are always the same
    /// (collection, page size), so re-dispatching is an identical request.
    fn retry(self: &Arc<Self>) {
        if self.can_retry.swap(false, Ordering::SeqCst) {
            self.fetch_next_page();
        }
    }
}

impl ListingControl for Arc<StoreBoundary> {
    fn on_approaching_edge(&self, direction: PageDirection) {
        match direction {
            // Stored positions start at zero and pages only ever append, so
            // there is nothing to load in front of the first stored item.
            PageDirection::Before => {}
            PageDirection::After => self.fetch_next_page(),
        }
    }

    fn retry(&self) {
        StoreBoundary::retry(self);
    }

    fn refresh(&self) {
        StoreBoundary::refresh(self);
    }
}
