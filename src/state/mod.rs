//! Network-state tracking
//!
//! A small state machine exposed per logical fetch slot (initial load,
//! forward page, backward page, refresh). The tracker is a pure state holder
//! with notification; retry policy belongs to the engines.

mod tracker;
mod types;

pub use tracker::{settled, NetworkStateCell, NetworkStateWatch};
pub use types::NetworkState;
