//! Durable store contract
//!
//! The durable engine only requires this interface: ordered reads by
//! position, transactional batch insert and delete-by-collection, and an
//! invalidation signal fired on every committed write. The store engine
//! itself is an external collaborator; [`MemoryPostStore`] is the reference
//! implementation used by the demo binary and tests.

mod memory;

pub use memory::MemoryPostStore;

use crate::error::Result;
use crate::types::Post;
use tokio::sync::watch;

/// Mutations available inside one atomic transaction
pub trait StoreTx {
    /// Next free position for a collection (max stored position + 1, or 0)
    fn next_position(&mut self, collection: &str) -> Result<u64>;

    /// Insert a batch of posts with positions already assigned
    fn insert(&mut self, posts: Vec<Post>) -> Result<()>;

    /// Delete every post in a collection
    fn delete_all(&mut self, collection: &str) -> Result<()>;
}

/// Ordered, transactional post storage
///
/// Writes happen only inside [`PostStore::run_atomically`], so no partial
/// page is ever visible mid-write. Every committed transaction bumps the
/// version observed through [`PostStore::watch`], which is the invalidation
/// signal driving re-reads of the listing.
pub trait PostStore: Send + Sync + 'static {
    /// Run a block of mutations as one transaction
    ///
    /// If the block returns an error nothing it did becomes visible.
    fn run_atomically(
        &self,
        block: &mut dyn FnMut(&mut dyn StoreTx) -> Result<()>,
    ) -> Result<()>;

    /// All posts in a collection, ordered by position ascending
    fn read_ordered(&self, collection: &str) -> Result<Vec<Post>>;

    /// Invalidation signal: the value changes after every committed write
    fn watch(&self) -> watch::Receiver<u64>;
}

#[cfg(test)]
mod tests;
