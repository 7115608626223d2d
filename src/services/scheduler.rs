// src/services/scheduler.rs

//! Daily update gating.
//!
//! Each feed is in one of three states for the current day (see
//! [`SourceState`]):
//!
//! - **Cold**: nothing stored. Fetch, store, report no new URLs.
//! - **StaleDay**: last fetch was on an earlier day. Fetch, diff against the
//!   stored `current`, rotate.
//! - **FetchedToday**: no network access. The diff between the stored
//!   `current` and `previous` is recomputed and returned as-is, so any
//!   number of checks on one day cost exactly one fetch and agree on the
//!   result.
//!
//! A failed fetch or write leaves the stored snapshot untouched.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{CheckOutcome, CheckStatus, DiffResult, Feed, SourceState};
use crate::pipeline::calculate_diff;
use crate::services::{Clock, DocumentFetcher, KeyedLock};
use crate::storage::SnapshotStore;

/// Per-feed fetch/diff/rotate driver.
pub struct UpdateScheduler {
    store: SnapshotStore,
    fetcher: Arc<dyn DocumentFetcher>,
    clock: Arc<dyn Clock>,
    locks: KeyedLock,
}

impl UpdateScheduler {
    pub fn new(store: SnapshotStore, fetcher: Arc<dyn DocumentFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            fetcher,
            clock,
            locks: KeyedLock::new(),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Check one feed. Never fails: errors come back as a failed outcome.
    ///
    /// Checks of the same feed are serialized; different feeds proceed
    /// independently.
    pub async fn check(&self, feed: &Feed) -> CheckOutcome {
        let _guard = self.locks.lock(feed.as_str()).await;

        match self.check_locked(feed).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Check failed for {}: {}", feed, e);
                CheckOutcome::failed(e.to_string())
            }
        }
    }

    async fn check_locked(&self, feed: &Feed) -> Result<CheckOutcome> {
        let today = self.clock.today();
        let snapshot = self.store.read(feed).await?;
        let state = snapshot.state(today);
        log::debug!("{} is {:?} on {}", feed, state, today);

        if state == SourceState::FetchedToday {
            let diff = match (&snapshot.current, &snapshot.previous) {
                (Some(current), Some(previous)) => calculate_diff(current, previous),
                _ => DiffResult::default(),
            };
            return Ok(CheckOutcome::completed(
                CheckStatus::AlreadyUpdated,
                format!("{} already updated today ({} new URLs)", feed, diff.len()),
                snapshot.archive.map(|a| a.path),
                diff,
            ));
        }

        let content = self.fetcher.fetch(feed.as_str()).await?;

        let (status, diff) = match snapshot.current.as_deref() {
            Some(old) if state == SourceState::StaleDay => {
                (CheckStatus::Updated, calculate_diff(&content, old))
            }
            _ => (CheckStatus::Seeded, DiffResult::default()),
        };

        let archive = self.store.rotate(feed, &content, today).await?;

        let message = match status {
            CheckStatus::Seeded => format!("{} fetched for the first time", feed),
            _ => format!("{} updated ({} new URLs)", feed, diff.len()),
        };
        log::info!("{}", message);

        Ok(CheckOutcome::completed(status, message, Some(archive.path), diff))
    }
}
