// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

//! # pagestream
//!
//! A boundary-driven pagination engine for infinite-scroll feeds.
//!
//! Remote listings are consumed page by page as a consumer scrolls: the
//! consumer reads a lazily-produced post sequence and the engine reacts to
//! "approaching an edge" signals by fetching, reconciling and re-delivering.
//! Fetch progress and failures are visible on observable state streams, and
//! retries are always consumer-initiated.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagestream::{build_repository, HttpPostSource, MemoryPostStore, RepositoryKind};
//! use pagestream::{PageDirection, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = Arc::new(HttpPostSource::new());
//!     let store = Arc::new(MemoryPostStore::new());
//!     let repo = build_repository(RepositoryKind::Db, source, store);
//!
//!     let listing = repo.open("rust", 10);
//!     let posts = listing.feed().snapshot()?;
//!
//!     // Consumer nears the end of what is loaded:
//!     listing.on_approaching_edge(PageDirection::After);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Listing                             │
//! │  feed() → PostFeed     network_state / refresh_state        │
//! │  on_approaching_edge(dir)    retry()    refresh()           │
//! └───────────────┬─────────────────────────────┬───────────────┘
//!                 │                             │
//! ┌───────────────┴───────────┐   ┌─────────────┴───────────────┐
//! │     DbPostRepository      │   │     PageKeyedRepository     │
//! │  durable store, absolute  │   │  in-memory, opaque cursor   │
//! │  positions, delete+insert │   │  tokens, invalidate to      │
//! │  refresh                  │   │  refresh                    │
//! └───────────┬───────────────┘   └─────────────┬───────────────┘
//!             │                                 │
//!       ┌─────┴─────┐                     ┌─────┴─────┐
//!       │ PostStore │                     │PostSource │
//!       └───────────┘                     └───────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Network-state tracking for fetch slots
pub mod state;

/// Remote source contract and HTTP implementation
pub mod source;

/// Durable store contract and in-memory implementation
pub mod store;

/// Listing façade and post feed
pub mod listing;

/// Paging repositories
pub mod repo;

/// Application configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::AppConfig;
pub use listing::{Listing, ListingControl, PostFeed};
pub use repo::{
    build_repository, DbPostRepository, PageKeyedRepository, PostRepository, RepositoryKind,
};
pub use source::{HttpPostSource, HttpSourceConfig, PostSource};
pub use state::{settled, NetworkState, NetworkStateCell, NetworkStateWatch};
pub use store::{MemoryPostStore, PostStore, StoreTx};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
