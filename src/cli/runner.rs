//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, EngineArg};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::listing::Listing;
use crate::repo::build_repository;
use crate::source::{HttpPostSource, HttpSourceConfig, PostSource};
use crate::state::{settled, NetworkState};
use crate::store::{MemoryPostStore, PostStore};
use crate::types::{PageDirection, Post};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check { collection } => self.check(collection.as_deref()).await,
            Commands::Read {
                collection,
                engine,
                pages,
                page_size,
            } => {
                self.read(collection.as_deref(), *engine, *pages, *page_size)
                    .await
            }
        }
    }

    /// Load configuration, falling back to defaults when no file is given
    fn load_config(&self) -> Result<AppConfig> {
        match &self.cli.config {
            Some(path) => AppConfig::from_path(path),
            None => Ok(AppConfig::default()),
        }
    }

    fn build_source(config: &AppConfig) -> Arc<dyn PostSource> {
        let http = HttpSourceConfig::builder()
            .base_url(&config.base_url)
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build();
        Arc::new(HttpPostSource::with_config(http))
    }

    /// Fetch one page directly to verify connectivity
    async fn check(&self, collection: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        let collection = collection.unwrap_or(&config.collection);
        let source = Self::build_source(&config);

        let page = source.fetch_top(collection, config.page_size).await?;
        println!(
            "ok: fetched {} posts from {collection}",
            page.posts.len()
        );
        if let Some(after) = &page.after {
            println!("next page cursor: {after}");
        }
        Ok(())
    }

    /// Open a listing and walk forward through it page by page
    async fn read(
        &self,
        collection: Option<&str>,
        engine: Option<EngineArg>,
        pages: u32,
        page_size: Option<u32>,
    ) -> Result<()> {
        let config = self.load_config()?;
        let collection = collection.unwrap_or(&config.collection).to_string();
        let page_size = page_size.unwrap_or(config.page_size);
        let kind = engine.map_or(config.repository, Into::into);

        info!(collection, page_size, ?kind, "opening listing");

        let source = Self::build_source(&config);
        let store: Arc<dyn PostStore> = Arc::new(MemoryPostStore::new());
        let repository = build_repository(kind, source, store);

        let listing = repository.open(&collection, page_size);
        let mut state = listing.watch_network_state();

        Self::await_settled(&mut state).await?;
        let mut printed = Self::print_new(&listing, 0)?;

        // Simulate a consumer scrolling towards the end: each boundary
        // trigger that leaves the state loading is a dispatched fetch.
        for _ in 0..pages {
            listing.on_approaching_edge(PageDirection::After);
            if !listing.network_state().is_loading() {
                info!(collection, "no further pages");
                break;
            }
            Self::await_settled(&mut state).await?;
            printed = Self::print_new(&listing, printed)?;
        }

        println!("{printed} posts total");
        Ok(())
    }

    async fn await_settled(state: &mut crate::state::NetworkStateWatch) -> Result<()> {
        match settled(state).await {
            NetworkState::Error { message } => Err(Error::Other(message)),
            _ => Ok(()),
        }
    }

    /// Print posts beyond the already-printed prefix, returning the new count
    fn print_new(listing: &Listing, printed: usize) -> Result<usize> {
        let posts = listing.feed().snapshot()?;
        for post in &posts[printed.min(posts.len())..] {
            Self::print_post(post);
        }
        Ok(posts.len())
    }

    fn print_post(post: &Post) {
        println!(
            "{:>6}  {:<24}  {}",
            post.score,
            truncate(&post.author, 24),
            post.title
        );
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
