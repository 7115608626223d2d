// src/services/notify.rs

//! Hand-off to the notification layer.
//!
//! The archive file of a check doubles as a "not yet delivered" token: it
//! is deleted only after delivery succeeds, so a same-day re-check that
//! still reports an archive means the earlier delivery never went through.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CheckOutcome, Feed};

/// Delivers new URLs somewhere (chat, mail, log...).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(
        &self,
        feed: &Feed,
        archive: Option<&Path>,
        urls: &BTreeSet<String>,
    ) -> Result<()>;
}

/// Writes new URLs to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(
        &self,
        feed: &Feed,
        archive: Option<&Path>,
        urls: &BTreeSet<String>,
    ) -> Result<()> {
        log::info!("{} new URL(s) in {}", urls.len(), feed);
        for url in urls {
            log::info!("    + {}", url);
        }
        if let Some(path) = archive {
            log::debug!("Archive copy: {}", path.display());
        }
        Ok(())
    }
}

/// Deliver a check's new URLs and consume its archive file.
///
/// Returns whether anything was delivered. On delivery failure the archive
/// file is kept and the error is returned.
pub async fn dispatch(feed: &Feed, outcome: &CheckOutcome, notifier: &dyn Notifier) -> Result<bool> {
    if !outcome.success {
        return Ok(false);
    }
    // Already delivered earlier today.
    if outcome.already_updated() && outcome.archive_file.is_none() {
        return Ok(false);
    }

    let archive = outcome.archive_file.as_deref();
    let delivered = if outcome.new_urls.is_empty() {
        false
    } else {
        notifier.deliver(feed, archive, &outcome.new_urls).await?;
        true
    };

    if let Some(path) = archive {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{CheckStatus, DiffResult};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        delivered: Mutex<Vec<usize>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for Recorder {
        async fn deliver(&self, _: &Feed, _: Option<&Path>, urls: &BTreeSet<String>) -> Result<()> {
            if self.fail {
                return Err(AppError::config("channel unavailable"));
            }
            self.delivered.lock().unwrap().push(urls.len());
            Ok(())
        }
    }

    fn outcome(status: CheckStatus, archive: Option<&Path>, urls: &[&str]) -> CheckOutcome {
        CheckOutcome::completed(
            status,
            "ok",
            archive.map(Path::to_path_buf),
            DiffResult {
                new_urls: urls.iter().map(|u| u.to_string()).collect(),
            },
        )
    }

    fn feed() -> Feed {
        Feed::parse("https://example.com/sitemap.xml").unwrap()
    }

    #[tokio::test]
    async fn test_delivers_and_removes_archive() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("2026-03-01.xml");
        std::fs::write(&archive, "<urlset/>").unwrap();

        let recorder = Recorder::default();
        let result = outcome(CheckStatus::Updated, Some(&archive), &["https://example.com/new"]);

        assert!(dispatch(&feed(), &result, &recorder).await.unwrap());
        assert_eq!(*recorder.delivered.lock().unwrap(), vec![1]);
        assert!(!archive.exists());
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_archive() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("2026-03-01.xml");
        std::fs::write(&archive, "<urlset/>").unwrap();

        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let result = outcome(CheckStatus::Updated, Some(&archive), &["https://example.com/new"]);

        assert!(dispatch(&feed(), &result, &recorder).await.is_err());
        assert!(archive.exists());
    }

    #[tokio::test]
    async fn test_consumed_same_day_result_is_skipped() {
        let recorder = Recorder::default();
        let result = outcome(CheckStatus::AlreadyUpdated, None, &["https://example.com/new"]);

        assert!(!dispatch(&feed(), &result, &recorder).await.unwrap());
        assert!(recorder.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_new_still_consumes_archive() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("2026-03-01.xml");
        std::fs::write(&archive, "<urlset/>").unwrap();

        let recorder = Recorder::default();
        let result = outcome(CheckStatus::Seeded, Some(&archive), &[]);

        assert!(!dispatch(&feed(), &result, &recorder).await.unwrap());
        assert!(!archive.exists());
    }

    #[tokio::test]
    async fn test_failed_check_is_not_dispatched() {
        let recorder = Recorder::default();
        let result = CheckOutcome::failed("HTTP 500");
        assert!(!dispatch(&feed(), &result, &recorder).await.unwrap());
    }
}
