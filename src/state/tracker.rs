//! Network-state cell
//!
//! A thread-safe "latest value + listeners" holder built on
//! `tokio::sync::watch`, which gives the required contract for free: a new
//! observer immediately sees the current value, then ordered delivery of
//! subsequent transitions.

use super::types::NetworkState;
use std::sync::Arc;
use tokio::sync::watch;

/// Observable handle onto a network-state cell
pub type NetworkStateWatch = watch::Receiver<NetworkState>;

/// Holder for the state of one fetch slot
///
/// Cloning shares the underlying cell; engines keep one clone per slot and
/// hand watches to the listing.
#[derive(Debug, Clone)]
pub struct NetworkStateCell {
    tx: Arc<watch::Sender<NetworkState>>,
}

impl NetworkStateCell {
    /// Create a cell in the `Idle` state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(NetworkState::Idle);
        Self { tx: Arc::new(tx) }
    }

    /// A fetch was dispatched
    pub fn start(&self) {
        self.tx.send_replace(NetworkState::Loading);
    }

    /// The in-flight fetch succeeded
    pub fn succeed(&self) {
        self.tx.send_replace(NetworkState::Loaded);
    }

    /// The in-flight fetch failed
    pub fn fail(&self, message: impl Into<String>) {
        self.tx.send_replace(NetworkState::error(message));
    }

    /// Current state
    pub fn current(&self) -> NetworkState {
        self.tx.borrow().clone()
    }

    /// Subscribe to state transitions, replaying the current value first
    pub fn watch(&self) -> NetworkStateWatch {
        self.tx.subscribe()
    }
}

impl Default for NetworkStateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait until the watched slot settles into `Loaded` or `Error`
///
/// Returns the settled state, or the last observed value if the cell was
/// dropped while still loading.
pub async fn settled(watch: &mut NetworkStateWatch) -> NetworkState {
    loop {
        let current = watch.borrow_and_update().clone();
        if current.is_settled() {
            return current;
        }
        if watch.changed().await.is_err() {
            return watch.borrow().clone();
        }
    }
}
