//! In-memory cursor paging engine
//!
//! Paginates directly against the remote source using the opaque page-key
//! tokens each response returns. No durable cache: the materialized sequence
//! lives in the session and is published as snapshots. Refreshing
//! invalidates the whole session, which is equivalent to opening a fresh
//! listing for the same collection and page size.

use super::PostRepository;
use crate::error::Result;
use crate::listing::{Listing, ListingControl, PostFeed};
use crate::source::PostSource;
use crate::state::NetworkStateCell;
use crate::types::{Page, PageDirection, Post};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::debug;

const LOCK: &str = "session lock poisoned";

/// Repository that pages entirely in memory using cursor tokens
pub struct PageKeyedRepository {
    source: Arc<dyn PostSource>,
}

impl PageKeyedRepository {
    /// Create a repository over the given source
    pub fn new(source: Arc<dyn PostSource>) -> Self {
        Self { source }
    }
}

impl PostRepository for PageKeyedRepository {
    fn open(&self, collection: &str, page_size: u32) -> Listing {
        let (snapshots, _) = watch::channel(Vec::new());
        let session = Arc::new(PageKeyedSession {
            source: Arc::clone(&self.source),
            collection: collection.to_string(),
            page_size: page_size.max(1),
            inner: Mutex::new(SessionInner::default()),
            snapshots,
            network_state: NetworkStateCell::new(),
            initial_state: NetworkStateCell::new(),
            generation: AtomicU64::new(0),
            initial_in_flight: AtomicBool::new(false),
            before_in_flight: AtomicBool::new(false),
            after_in_flight: AtomicBool::new(false),
        });

        session.dispatch_initial();

        Listing::new(
            PostFeed::materialized(session.snapshots.subscribe()),
            session.network_state.watch(),
            // The initial-load slot doubles as the refresh indicator: a
            // refresh of this engine is a restarted initial load.
            session.initial_state.watch(),
            Arc::new(Arc::clone(&session)),
        )
    }
}

/// Materialized paging state of one opened listing
#[derive(Default)]
struct SessionInner {
    posts: Vec<Post>,
    before: Option<String>,
    after: Option<String>,
    /// Set once the initial load applied; edge triggers are ignored until
    /// then because there are no cursors to page from yet.
    loaded: bool,
    /// Latest failed fetch per slot, re-issued by `retry`. A slot holds at
    /// most one record and a success in the slot clears it.
    failed: Vec<FailedFetch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FailedFetch {
    Initial,
    Edge {
        direction: PageDirection,
        cursor: String,
    },
}

impl FailedFetch {
    /// Whether this record belongs to the edge slot for `direction`
    fn is_for(&self, direction: PageDirection) -> bool {
        matches!(self, Self::Edge { direction: d, .. } if *d == direction)
    }
}

/// One listing's session against the remote source
///
/// Guard/generation discipline: every dispatch acquires its direction's
/// single-flight guard and captures the generation while holding the session
/// lock, and every settle re-checks the generation under the same lock. An
/// invalidation bumps the generation and resets the guards itself, so a
/// stale settle must leave the guards alone.
struct PageKeyedSession {
    source: Arc<dyn PostSource>,
    collection: String,
    page_size: u32,
    inner: Mutex<SessionInner>,
    snapshots: watch::Sender<Vec<Post>>,
    network_state: NetworkStateCell,
    initial_state: NetworkStateCell,
    generation: AtomicU64,
    initial_in_flight: AtomicBool,
    before_in_flight: AtomicBool,
    after_in_flight: AtomicBool,
}

impl PageKeyedSession {
    fn guard(&self, direction: PageDirection) -> &AtomicBool {
        match direction {
            PageDirection::Before => &self.before_in_flight,
            PageDirection::After => &self.after_in_flight,
        }
    }

    /// Dispatch the cursorless first fetch
    fn dispatch_initial(self: &Arc<Self>) {
        let generation = {
            let _inner = self.inner.lock().expect(LOCK);
            if self
                .initial_in_flight
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return;
            }
            self.network_state.start();
            self.initial_state.start();
            self.generation.load(Ordering::SeqCst)
        };
        self.spawn_initial(generation);
    }

    fn spawn_initial(self: &Arc<Self>, generation: u64) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let result = this.source.fetch_top(&this.collection, this.page_size).await;
            this.settle_initial(generation, result);
        });
    }

    fn settle_initial(&self, generation: u64, result: Result<Page>) {
        let mut inner = self.inner.lock().expect(LOCK);
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(collection = %self.collection, "dropping stale initial load");
            return;
        }
        match result {
            Ok(page) => {
                inner.posts = page.posts;
                inner.before = page.before;
                inner.after = page.after;
                inner.loaded = true;
                inner.failed.retain(|f| *f != FailedFetch::Initial);
                let snapshot = inner.posts.clone();
                self.initial_in_flight.store(false, Ordering::SeqCst);
                drop(inner);
                self.snapshots.send_replace(snapshot);
                self.network_state.succeed();
                self.initial_state.succeed();
            }
            Err(e) => {
                inner.failed.retain(|f| *f != FailedFetch::Initial);
                inner.failed.push(FailedFetch::Initial);
                self.initial_in_flight.store(false, Ordering::SeqCst);
                drop(inner);
                self.network_state.fail(e.to_string());
                self.initial_state.fail(e.to_string());
            }
        }
    }

    /// Dispatch an edge fetch if the direction has a live cursor and no
    /// fetch already in flight
    fn trigger_edge(self: &Arc<Self>, direction: PageDirection) {
        let dispatch = {
            let inner = self.inner.lock().expect(LOCK);
            if !inner.loaded {
                return;
            }
            // A direction whose token came back null is finished for this
            // listing's lifetime.
            let cursor = match direction {
                PageDirection::Before => inner.before.clone(),
                PageDirection::After => inner.after.clone(),
            };
            let Some(cursor) = cursor else { return };
            if self
                .guard(direction)
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return;
            }
            self.network_state.start();
            (self.generation.load(Ordering::SeqCst), cursor)
        };
        self.spawn_edge(dispatch.0, direction, dispatch.1);
    }

    fn spawn_edge(self: &Arc<Self>, generation: u64, direction: PageDirection, cursor: String) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let result = this
                .source
                .fetch_page(&this.collection, this.page_size, &cursor, direction)
                .await;
            this.settle_edge(generation, direction, cursor, result);
        });
    }

    fn settle_edge(
        &self,
        generation: u64,
        direction: PageDirection,
        cursor: String,
        result: Result<Page>,
    ) {
        let mut inner = self.inner.lock().expect(LOCK);
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(collection = %self.collection, %direction, "dropping stale edge fetch");
            return;
        }
        match result {
            Ok(page) => {
                match direction {
                    PageDirection::After => {
                        inner.after = page.after;
                        inner.posts.extend(page.posts);
                    }
                    PageDirection::Before => {
                        inner.before = page.before;
                        let mut posts = page.posts;
                        posts.append(&mut inner.posts);
                        inner.posts = posts;
                    }
                }
                // The slot recovered: an older failure record for it is no
                // longer re-issuable, its cursor was already consumed.
                inner.failed.retain(|f| !f.is_for(direction));
                let snapshot = inner.posts.clone();
                self.guard(direction).store(false, Ordering::SeqCst);
                drop(inner);
                self.snapshots.send_replace(snapshot);
                self.network_state.succeed();
            }
            Err(e) => {
                inner.failed.retain(|f| !f.is_for(direction));
                inner.failed.push(FailedFetch::Edge { direction, cursor });
                self.guard(direction).store(false, Ordering::SeqCst);
                drop(inner);
                self.network_state.fail(e.to_string());
            }
        }
    }

    /// Re-issue every recorded failed fetch with its original cursor
    ///
    /// A slot already back in flight keeps its record for a later retry; its
    /// in-flight settle will clear or replace it.
    fn retry_all_failed(self: &Arc<Self>) {
        let dispatches = {
            let mut inner = self.inner.lock().expect(LOCK);
            let generation = self.generation.load(Ordering::SeqCst);
            let mut dispatches = Vec::new();
            let mut kept = Vec::new();
            for fetch in std::mem::take(&mut inner.failed) {
                let acquired = match &fetch {
                    FailedFetch::Initial => self
                        .initial_in_flight
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok(),
                    FailedFetch::Edge { direction, .. } => self
                        .guard(*direction)
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok(),
                };
                if !acquired {
                    kept.push(fetch);
                    continue;
                }
                match &fetch {
                    FailedFetch::Initial => {
                        self.network_state.start();
                        self.initial_state.start();
                    }
                    FailedFetch::Edge { .. } => self.network_state.start(),
                }
                dispatches.push((generation, fetch));
            }
            inner.failed = kept;
            dispatches
        };
        for (generation, fetch) in dispatches {
            match fetch {
                FailedFetch::Initial => self.spawn_initial(generation),
                FailedFetch::Edge { direction, cursor } => {
                    self.spawn_edge(generation, direction, cursor);
                }
            }
        }
    }

    /// Drop all held state and restart from a fresh initial load
    fn invalidate(self: &Arc<Self>) {
        {
            let mut inner = self.inner.lock().expect(LOCK);
            self.generation.fetch_add(1, Ordering::SeqCst);
            *inner = SessionInner::default();
            // In-flight results are stale now; their settles observe the new
            // generation and leave these guards untouched.
            self.initial_in_flight.store(false, Ordering::SeqCst);
            self.before_in_flight.store(false, Ordering::SeqCst);
            self.after_in_flight.store(false, Ordering::SeqCst);
        }
        self.snapshots.send_replace(Vec::new());
        self.dispatch_initial();
    }
}

impl ListingControl for Arc<PageKeyedSession> {
    fn on_approaching_edge(&self, direction: PageDirection) {
        self.trigger_edge(direction);
    }

    fn retry(&self) {
        self.retry_all_failed();
    }

    fn refresh(&self) {
        self.invalidate();
    }
}
