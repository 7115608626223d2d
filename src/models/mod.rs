// src/models/mod.rs

//! Domain models for the sitemap watcher.
//!
//! This module contains the data structures shared by storage, the diff
//! engine and the scheduler.

mod config;
mod feed;
mod outcome;
mod snapshot;

// Re-export all public types
pub use config::{Config, FetcherConfig, ResolverConfig, WatchConfig};
pub use feed::Feed;
pub use outcome::{CheckOutcome, CheckStatus, DiffResult, FeedReply};
pub use snapshot::{ArchiveFile, Snapshot, SourceState};
