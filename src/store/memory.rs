//! In-memory post store
//!
//! Reference [`PostStore`] implementation. Transactions run against a
//! snapshot of the data and the snapshot is swapped in on commit, so a
//! failed block is never observable.

use super::{PostStore, StoreTx};
use crate::error::Result;
use crate::types::Post;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;

type Collections = HashMap<String, Vec<Post>>;

/// In-memory implementation of [`PostStore`]
#[derive(Debug)]
pub struct MemoryPostStore {
    inner: Mutex<Collections>,
    version: watch::Sender<u64>,
}

impl MemoryPostStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Mutex::new(HashMap::new()),
            version,
        }
    }

    /// Total number of stored posts across all collections
    pub fn len(&self) -> usize {
        self.inner.lock().expect("store lock poisoned").values().map(Vec::len).sum()
    }

    /// Check if the store holds no posts
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PostStore for MemoryPostStore {
    fn run_atomically(
        &self,
        block: &mut dyn FnMut(&mut dyn StoreTx) -> Result<()>,
    ) -> Result<()> {
        let mut guard = self.inner.lock().expect("store lock poisoned");
        let mut tx = MemoryTx {
            data: guard.clone(),
            dirty: false,
        };
        block(&mut tx)?;
        if tx.dirty {
            *guard = tx.data;
            drop(guard);
            self.version.send_modify(|v| *v += 1);
        }
        Ok(())
    }

    fn read_ordered(&self, collection: &str) -> Result<Vec<Post>> {
        let guard = self.inner.lock().expect("store lock poisoned");
        let mut posts = guard.get(collection).cloned().unwrap_or_default();
        posts.sort_by_key(|p| p.position);
        Ok(posts)
    }

    fn watch(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

/// Transaction over a snapshot of the store
struct MemoryTx {
    data: Collections,
    dirty: bool,
}

impl StoreTx for MemoryTx {
    fn next_position(&mut self, collection: &str) -> Result<u64> {
        let next = self
            .data
            .get(collection)
            .and_then(|posts| posts.iter().map(|p| p.position).max())
            .map_or(0, |max| max + 1);
        Ok(next)
    }

    fn insert(&mut self, posts: Vec<Post>) -> Result<()> {
        for post in posts {
            self.data.entry(post.collection.clone()).or_default().push(post);
        }
        self.dirty = true;
        Ok(())
    }

    fn delete_all(&mut self, collection: &str) -> Result<()> {
        self.data.remove(collection);
        self.dirty = true;
        Ok(())
    }
}
