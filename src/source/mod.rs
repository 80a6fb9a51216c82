//! Remote source contract
//!
//! The transport is an external collaborator; the engines only need an
//! asynchronous request that reports exactly one success-or-failure outcome
//! and is safe to repeat given the same cursor. [`HttpPostSource`] is the
//! reqwest-backed implementation speaking the listing envelope format.

mod http;

pub use http::{HttpPostSource, HttpSourceConfig, HttpSourceConfigBuilder};

use crate::error::Result;
use crate::types::{Page, PageDirection};
use async_trait::async_trait;

/// Asynchronous remote listing source
#[async_trait]
pub trait PostSource: Send + Sync + 'static {
    /// Fetch the top of a collection
    ///
    /// Used by the durable engine (which ignores the returned cursor tokens)
    /// and for the in-memory engine's initial load.
    async fn fetch_top(&self, collection: &str, limit: u32) -> Result<Page>;

    /// Fetch the page adjacent to `cursor` in the given direction
    async fn fetch_page(
        &self,
        collection: &str,
        limit: u32,
        cursor: &str,
        direction: PageDirection,
    ) -> Result<Page>;
}
