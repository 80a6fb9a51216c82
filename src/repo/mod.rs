//! Paging repositories
//!
//! Two reconciliation strategies behind one contract:
//!
//! - [`DbPostRepository`] persists fetched pages in a durable store and
//!   streams the stored order back, growing the store lazily as the consumer
//!   approaches its edges.
//! - [`PageKeyedRepository`] paginates directly against the remote source
//!   using the cursor tokens each response returns, with no durable cache.
//!
//! A consumer obtains a [`Listing`] from either and is agnostic to which is
//! active.

mod db;
mod mem;

pub use db::DbPostRepository;
pub use mem::PageKeyedRepository;

use crate::listing::Listing;
use crate::source::PostSource;
use crate::store::PostStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Uniform entry point for opening listings
///
/// Must be called within a tokio runtime: opening a listing may dispatch
/// background fetch tasks.
pub trait PostRepository: Send + Sync {
    /// Open a listing of the named collection
    fn open(&self, collection: &str, page_size: u32) -> Listing;
}

/// Which paging strategy to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryKind {
    /// Durable-store-backed paging
    #[default]
    Db,
    /// In-memory cursor paging
    InMemory,
}

/// Build a repository of the requested kind
///
/// The store is only consulted by the durable strategy; the in-memory
/// strategy ignores it.
pub fn build_repository(
    kind: RepositoryKind,
    source: Arc<dyn PostSource>,
    store: Arc<dyn PostStore>,
) -> Arc<dyn PostRepository> {
    match kind {
        RepositoryKind::Db => Arc::new(DbPostRepository::new(source, store)),
        RepositoryKind::InMemory => Arc::new(PageKeyedRepository::new(source)),
    }
}
