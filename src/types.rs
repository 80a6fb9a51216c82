//! Common types used throughout pagestream
//!
//! The item model and the two addressing schemes: absolute positions for the
//! durable engine, opaque cursor tokens for the in-memory engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Item Model
// ============================================================================

/// A single post in a named collection
///
/// Everything except `position` comes from the remote source and is never
/// modified. `position` is assigned by the durable engine at insert time: a
/// dense, monotonically increasing integer unique within a collection, in
/// arrival order. Once stored it is never reassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Remote identifier, unique within the source
    pub id: String,
    /// Post title
    pub title: String,
    /// Author handle
    pub author: String,
    /// Vote score at fetch time
    pub score: i64,
    /// Collection this post belongs to
    pub collection: String,
    /// Creation time reported by the remote source
    pub created_at: DateTime<Utc>,
    /// Absolute ordering index, durable engine only
    #[serde(default)]
    pub position: u64,
}

// ============================================================================
// Pages and Cursors
// ============================================================================

/// One page of a remote listing response
///
/// `before` and `after` are opaque cursor tokens owned by the remote source.
/// `None` means no further page exists in that direction. Tokens are held by
/// the in-memory engine only and never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Posts in remote order
    pub posts: Vec<Post>,
    /// Token for the page preceding this one
    pub before: Option<String>,
    /// Token for the page following this one
    pub after: Option<String>,
}

impl Page {
    /// Create a page with no cursor tokens
    pub fn of(posts: Vec<Post>) -> Self {
        Self {
            posts,
            before: None,
            after: None,
        }
    }

    /// Cursor token for the given direction
    pub fn token(&self, direction: PageDirection) -> Option<&str> {
        match direction {
            PageDirection::Before => self.before.as_deref(),
            PageDirection::After => self.after.as_deref(),
        }
    }
}

/// Paging direction
///
/// Doubles as the boundary signal: approaching the front of a listing asks
/// for the `Before` page, approaching the end asks for the `After` page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageDirection {
    /// Towards older / preceding items
    Before,
    /// Towards newer / following items
    After,
}

impl std::fmt::Display for PageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}
