// src/services/watcher.rs

//! Facade tying the registry, scheduler and resolver together.
//!
//! This is the surface bot commands, scheduled jobs and the CLI talk to.
//! Every operation returns a result value; nothing here propagates a
//! fault for a single bad feed.

use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{CheckOutcome, Config, Feed, FeedReply};
use crate::services::{
    Clock, DocumentFetcher, HttpFetcher, IndexResolver, SystemClock, UpdateScheduler,
};
use crate::storage::{FeedRegistry, LocalStorage, SnapshotStore};

/// Watched-feed operations over one storage root.
pub struct SitemapWatcher {
    registry: FeedRegistry,
    scheduler: UpdateScheduler,
    resolver: IndexResolver,
    max_concurrent: usize,
}

impl SitemapWatcher {
    /// Open the watcher with an HTTP fetcher and the system clock.
    pub async fn open(root_dir: impl Into<PathBuf>, config: &Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.fetcher)?);
        Self::with_parts(LocalStorage::new(root_dir), fetcher, Arc::new(SystemClock), config).await
    }

    /// Open the watcher with explicit collaborators.
    pub async fn with_parts(
        storage: LocalStorage,
        fetcher: Arc<dyn DocumentFetcher>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Result<Self> {
        let registry = FeedRegistry::open(storage.clone()).await?;
        let scheduler = UpdateScheduler::new(SnapshotStore::new(storage), Arc::clone(&fetcher), clock);
        let resolver = IndexResolver::new(fetcher, config.resolver.max_depth);

        Ok(Self {
            registry,
            scheduler,
            resolver,
            max_concurrent: config.watch.max_concurrent.max(1),
        })
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    /// Watched feed URLs in insertion order.
    pub async fn list_feeds(&self) -> Vec<String> {
        self.registry
            .list()
            .await
            .into_iter()
            .map(|feed| feed.to_string())
            .collect()
    }

    pub async fn is_watched(&self, url: &str) -> bool {
        match Feed::parse(url) {
            Ok(feed) => self.registry.contains(&feed).await,
            Err(_) => false,
        }
    }

    /// Register a feed and seed its snapshot with one check.
    ///
    /// If the seeding check fails the registration is rolled back.
    pub async fn add_feed(&self, url: &str) -> CheckOutcome {
        let feed = match Feed::parse(url) {
            Ok(feed) => feed,
            Err(e) => return CheckOutcome::failed(format!("Invalid feed URL {url}: {e}")),
        };

        match self.registry.add(&feed).await {
            Ok(true) => {}
            Ok(false) => return CheckOutcome::failed(format!("{feed} already exists")),
            Err(e) => return CheckOutcome::failed(format!("Failed to save {feed}: {e}")),
        }

        let mut outcome = self.scheduler.check(&feed).await;
        if !outcome.success {
            if let Err(e) = self.registry.remove(&feed).await {
                log::error!("Failed to roll back registration of {}: {}", feed, e);
            }
            outcome.message = format!("Failed to add {feed}: {}", outcome.message);
            return outcome;
        }

        log::info!("Now watching {}", feed);
        outcome.message = format!("Added {feed}: {}", outcome.message);
        outcome
    }

    /// Stop watching a feed. Stored snapshots are kept.
    pub async fn remove_feed(&self, url: &str) -> FeedReply {
        let feed = match Feed::parse(url) {
            Ok(feed) => feed,
            Err(e) => return FeedReply::err(format!("Invalid feed URL {url}: {e}")),
        };

        match self.registry.remove(&feed).await {
            Ok(true) => {
                log::info!("Stopped watching {}", feed);
                FeedReply::ok(format!("Removed {feed}"))
            }
            Ok(false) => FeedReply::err(format!("{feed} is not being watched")),
            Err(e) => FeedReply::err(format!("Failed to save registry: {e}")),
        }
    }

    /// Flattened leaf URL set of a sitemap or sitemap index, sorted.
    pub async fn resolve_all_urls(&self, url: &str) -> Result<Vec<String>> {
        let feed = Feed::parse(url)?;
        Ok(self.resolver.resolve_all(feed.as_str()).await?.into_iter().collect())
    }

    /// Check one feed, registered or not.
    pub async fn check(&self, url: &str) -> CheckOutcome {
        match Feed::parse(url) {
            Ok(feed) => self.scheduler.check(&feed).await,
            Err(e) => CheckOutcome::failed(format!("Invalid feed URL {url}: {e}")),
        }
    }

    /// Check every registered feed, at most `max_concurrent` at a time.
    ///
    /// Results come back in registry order; a failing feed does not affect
    /// the others.
    pub async fn check_all(&self) -> Vec<(Feed, CheckOutcome)> {
        let feeds = self.registry.list().await;
        log::info!("Checking {} feeds", feeds.len());

        stream::iter(feeds)
            .map(|feed| async move {
                let outcome = self.scheduler.check(&feed).await;
                (feed, outcome)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }
}
