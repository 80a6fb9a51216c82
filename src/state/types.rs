//! Network state values

use serde::{Deserialize, Serialize};

/// State of one logical fetch slot
///
/// A slot is created `Idle`, enters `Loading` when a fetch is dispatched and
/// settles exactly once per fetch into `Loaded` or `Error`. A retry re-enters
/// `Loading` from `Error` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NetworkState {
    /// No fetch dispatched yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch succeeded
    Loaded,
    /// The last fetch failed
    Error {
        /// Human-readable failure description
        message: String,
    },
}

impl NetworkState {
    /// Create an error state
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Check if a fetch is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if the last fetch succeeded
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }

    /// Check if the last fetch failed
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Check if this state is settled (neither idle nor loading)
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Loaded | Self::Error { .. })
    }
}

impl std::fmt::Display for NetworkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Loaded => write!(f, "loaded"),
            Self::Error { message } => write!(f, "error: {message}"),
        }
    }
}
