//! Listing façade
//!
//! The uniform shape both paging engines adapt to: a lazily-produced ordered
//! post sequence, a network-state stream, a refresh-state stream, and
//! forwarded `retry` / `refresh` / boundary-trigger actions. The façade is a
//! pure composition point with no state of its own.

use crate::error::Result;
use crate::state::{NetworkState, NetworkStateWatch};
use crate::store::PostStore;
use crate::types::{PageDirection, Post};
use std::sync::Arc;
use tokio::sync::watch;

/// Engine-side controls a listing forwards to
///
/// One implementation per paging engine; selected at listing creation time
/// and never switched mid-lifecycle.
pub trait ListingControl: Send + Sync {
    /// The consumer is near the start/end of the available items
    fn on_approaching_edge(&self, direction: PageDirection);

    /// Re-issue whichever fetch most recently failed
    fn retry(&self);

    /// Re-fetch the listing from the top
    fn refresh(&self);
}

/// A paged listing of one collection
///
/// Created once per (collection, page size) request; discard it when asking
/// for a different collection. Results of fetches still in flight at that
/// point are silently dropped by the owning engine.
pub struct Listing {
    feed: PostFeed,
    network_state: NetworkStateWatch,
    refresh_state: NetworkStateWatch,
    control: Arc<dyn ListingControl>,
}

impl Listing {
    /// Assemble a listing from engine parts
    pub(crate) fn new(
        feed: PostFeed,
        network_state: NetworkStateWatch,
        refresh_state: NetworkStateWatch,
        control: Arc<dyn ListingControl>,
    ) -> Self {
        Self {
            feed,
            network_state,
            refresh_state,
            control,
        }
    }

    /// The ordered post sequence
    pub fn feed(&self) -> &PostFeed {
        &self.feed
    }

    /// Mutable access to the feed, needed to await changes
    pub fn feed_mut(&mut self) -> &mut PostFeed {
        &mut self.feed
    }

    /// Current boundary-fetch state
    pub fn network_state(&self) -> NetworkState {
        self.network_state.borrow().clone()
    }

    /// Subscribe to boundary-fetch state transitions
    pub fn watch_network_state(&self) -> NetworkStateWatch {
        self.network_state.clone()
    }

    /// Subscribe to refresh state transitions
    pub fn watch_refresh_state(&self) -> NetworkStateWatch {
        self.refresh_state.clone()
    }

    /// Signal that the consumer is approaching an edge of the loaded items
    pub fn on_approaching_edge(&self, direction: PageDirection) {
        self.control.on_approaching_edge(direction);
    }

    /// Re-issue the most recently failed fetch, if any
    pub fn retry(&self) {
        self.control.retry();
    }

    /// Reload the listing from the top
    pub fn refresh(&self) {
        self.control.refresh();
    }
}

impl std::fmt::Debug for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listing")
            .field("network_state", &*self.network_state.borrow())
            .field("refresh_state", &*self.refresh_state.borrow())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Post Feed
// ============================================================================

/// Lazily-produced, ordered post sequence
///
/// Backed either by ordered reads of the durable store (re-queried on its
/// invalidation signal) or by materialized snapshots published by the
/// in-memory engine. Either way the sequence only ever grows by appends and
/// prepends until the listing is refreshed.
pub struct PostFeed {
    inner: FeedInner,
}

enum FeedInner {
    Stored {
        store: Arc<dyn PostStore>,
        collection: String,
        version: watch::Receiver<u64>,
    },
    Materialized {
        snapshots: watch::Receiver<Vec<Post>>,
    },
}

impl PostFeed {
    /// Feed over ordered store reads
    pub(crate) fn stored(store: Arc<dyn PostStore>, collection: impl Into<String>) -> Self {
        let version = store.watch();
        Self {
            inner: FeedInner::Stored {
                store,
                collection: collection.into(),
                version,
            },
        }
    }

    /// Feed over published snapshots
    pub(crate) fn materialized(snapshots: watch::Receiver<Vec<Post>>) -> Self {
        Self {
            inner: FeedInner::Materialized { snapshots },
        }
    }

    /// Current ordered snapshot of the sequence
    pub fn snapshot(&self) -> Result<Vec<Post>> {
        match &self.inner {
            FeedInner::Stored {
                store, collection, ..
            } => store.read_ordered(collection),
            FeedInner::Materialized { snapshots } => Ok(snapshots.borrow().clone()),
        }
    }

    /// Wait for the sequence to change
    ///
    /// Returns `false` if the producing engine is gone and no further change
    /// can happen.
    pub async fn changed(&mut self) -> bool {
        match &mut self.inner {
            FeedInner::Stored { version, .. } => version.changed().await.is_ok(),
            FeedInner::Materialized { snapshots } => snapshots.changed().await.is_ok(),
        }
    }
}

impl std::fmt::Debug for PostFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.inner {
            FeedInner::Stored { .. } => "stored",
            FeedInner::Materialized { .. } => "materialized",
        };
        f.debug_struct("PostFeed").field("kind", &kind).finish()
    }
}
