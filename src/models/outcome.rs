// src/models/outcome.rs

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// URLs present in the newer document but absent from the older one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub new_urls: BTreeSet<String>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.new_urls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.new_urls.len()
    }
}

/// How a check was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// First fetch for the feed; no baseline to diff against
    Seeded,
    /// Fetched and diffed against the previous snapshot
    Updated,
    /// Already fetched today; diff recomputed from stored snapshots
    AlreadyUpdated,
    /// Nothing changed on disk
    Failed,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckStatus::Seeded => "seeded",
            CheckStatus::Updated => "updated",
            CheckStatus::AlreadyUpdated => "already updated",
            CheckStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Result of checking a single feed.
///
/// `success` is false only when `status` is [`CheckStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub success: bool,
    pub status: CheckStatus,
    pub message: String,
    pub archive_file: Option<PathBuf>,
    pub new_urls: BTreeSet<String>,
}

impl CheckOutcome {
    pub fn completed(
        status: CheckStatus,
        message: impl Into<String>,
        archive_file: Option<PathBuf>,
        diff: DiffResult,
    ) -> Self {
        Self {
            success: true,
            status,
            message: message.into(),
            archive_file,
            new_urls: diff.new_urls,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            status: CheckStatus::Failed,
            message: message.into(),
            archive_file: None,
            new_urls: BTreeSet::new(),
        }
    }

    pub fn already_updated(&self) -> bool {
        self.status == CheckStatus::AlreadyUpdated
    }
}

/// Result of a registry-only operation such as removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedReply {
    pub success: bool,
    pub message: String,
}

impl FeedReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
