//! HTTP post source
//!
//! Fetches listing pages from a reddit-style JSON API:
//! `GET {base}/r/{collection}/top.json?limit=N[&after=tok|&before=tok]`
//! with the response envelope
//! `{ "data": { "children": [{ "data": { … } }], "before": …, "after": … } }`.
//!
//! There is deliberately no retry or backoff here: the engines surface every
//! failure on a state stream and retries are always consumer-initiated.

use super::PostSource;
use crate::error::{Error, Result};
use crate::types::{Page, PageDirection, Post};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for the HTTP source
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Base URL of the listing API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("pagestream/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpSourceConfig {
    /// Create a new config builder
    pub fn builder() -> HttpSourceConfigBuilder {
        HttpSourceConfigBuilder::default()
    }
}

/// Builder for HTTP source config
#[derive(Default)]
pub struct HttpSourceConfigBuilder {
    config: HttpSourceConfig,
}

impl HttpSourceConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpSourceConfig {
        self.config
    }
}

/// Reqwest-backed [`PostSource`]
pub struct HttpPostSource {
    client: Client,
    config: HttpSourceConfig,
}

impl HttpPostSource {
    /// Create a source with the default configuration
    pub fn new() -> Self {
        Self::with_config(HttpSourceConfig::default())
    }

    /// Create a source with custom configuration
    pub fn with_config(config: HttpSourceConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    async fn fetch(
        &self,
        collection: &str,
        limit: u32,
        cursor: Option<(&str, PageDirection)>,
    ) -> Result<Page> {
        let url = Url::parse(&format!(
            "{}/r/{}/top.json",
            self.config.base_url.trim_end_matches('/'),
            collection
        ))?;

        let mut query = vec![("limit".to_string(), limit.to_string())];
        if let Some((token, direction)) = cursor {
            query.push((direction.to_string(), token.to_string()));
        }

        let mut req = self.client.get(url).query(&query);
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        let envelope: ListingEnvelope = serde_json::from_str(&body)
            .map_err(|e| Error::malformed(format!("unexpected listing payload: {e}")))?;

        debug!(
            collection,
            count = envelope.data.children.len(),
            after = envelope.data.after.as_deref(),
            "fetched listing page"
        );

        Ok(envelope.into_page(collection))
    }
}

impl Default for HttpPostSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HttpPostSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPostSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PostSource for HttpPostSource {
    async fn fetch_top(&self, collection: &str, limit: u32) -> Result<Page> {
        self.fetch(collection, limit, None).await
    }

    async fn fetch_page(
        &self,
        collection: &str,
        limit: u32,
        cursor: &str,
        direction: PageDirection,
    ) -> Result<Page> {
        self.fetch(collection, limit, Some((cursor, direction))).await
    }
}

// ============================================================================
// Wire Format
// ============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct ListingEnvelope {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListingData {
    pub children: Vec<PostEnvelope>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PostEnvelope {
    pub data: RawPost,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawPost {
    pub name: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: f64,
}

impl ListingEnvelope {
    pub(super) fn into_page(self, collection: &str) -> Page {
        let posts = self
            .data
            .children
            .into_iter()
            .map(|child| child.data.into_post(collection))
            .collect();
        Page {
            posts,
            before: self.data.before,
            after: self.data.after,
        }
    }
}

impl RawPost {
    fn into_post(self, collection: &str) -> Post {
        Post {
            id: self.name,
            title: self.title,
            author: self.author,
            score: self.score,
            collection: collection.to_string(),
            created_at: DateTime::from_timestamp(self.created_utc as i64, 0).unwrap_or_default(),
            position: 0,
        }
    }
}
