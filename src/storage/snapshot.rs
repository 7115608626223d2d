//! Per-feed snapshot persistence.
//!
//! ```text
//! sitemaps/{host}_{digest}/
//! ├── current.xml      # latest successful fetch
//! ├── latest.xml       # what current.xml held before that
//! ├── last_update      # YYYY-MM-DD of the latest successful fetch
//! └── archive/
//!     └── YYYY-MM-DD.xml
//! ```

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{ArchiveFile, Feed, Snapshot};
use crate::storage::LocalStorage;

const SITEMAPS_DIR: &str = "sitemaps";
const CURRENT: &str = "current.xml";
const PREVIOUS: &str = "latest.xml";
const MARKER: &str = "last_update";
const ARCHIVE_DIR: &str = "archive";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Snapshot store for all feeds under one storage root.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    storage: LocalStorage,
}

impl SnapshotStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    fn key(feed: &Feed, file: &str) -> String {
        format!("{}/{}/{}", SITEMAPS_DIR, feed.storage_key(), file)
    }

    fn archive_key(feed: &Feed, date: NaiveDate) -> String {
        Self::key(
            feed,
            &format!("{}/{}.xml", ARCHIVE_DIR, date.format(DATE_FORMAT)),
        )
    }

    /// Load everything stored for a feed.
    pub async fn read(&self, feed: &Feed) -> Result<Snapshot> {
        let current = self.storage.read_string(&Self::key(feed, CURRENT)).await?;
        let previous = self.storage.read_string(&Self::key(feed, PREVIOUS)).await?;
        let last_update = self.last_update(feed).await?;

        let archive = self
            .archive_dates(feed)
            .await?
            .into_iter()
            .max()
            .map(|date| ArchiveFile {
                date,
                path: self.storage.path(&Self::archive_key(feed, date)),
            });

        Ok(Snapshot {
            current,
            previous,
            archive,
            last_update,
        })
    }

    /// True iff the last successful fetch happened on `today`.
    pub async fn already_updated(&self, feed: &Feed, today: NaiveDate) -> Result<bool> {
        Ok(self.last_update(feed).await? == Some(today))
    }

    /// Shift `current` into `previous`, store `content` as the new `current`,
    /// write today's archive copy and stamp the marker.
    ///
    /// Either every file moves to the new day or none does: on any write
    /// error the files touched so far are put back before the error is
    /// returned. Archives from earlier days are dropped only once the new
    /// snapshot is in place.
    pub async fn rotate(&self, feed: &Feed, content: &str, today: NaiveDate) -> Result<ArchiveFile> {
        let keys = [
            Self::archive_key(feed, today),
            Self::key(feed, PREVIOUS),
            Self::key(feed, CURRENT),
            Self::key(feed, MARKER),
        ];

        let mut saved = Vec::with_capacity(keys.len());
        for key in &keys {
            saved.push(self.storage.read_bytes(key).await?);
        }

        if let Err(e) = self.commit(&keys, &saved[2], content, today).await {
            log::warn!("Rotation failed for {}, restoring snapshot: {}", feed, e);
            for (key, bytes) in keys.iter().zip(&saved) {
                self.restore(key, bytes.as_deref()).await;
            }
            return Err(e);
        }

        for date in self.archive_dates(feed).await? {
            if date != today {
                log::debug!("Dropping unconsumed archive {} for {}", date, feed);
                if let Err(e) = self.storage.remove(&Self::archive_key(feed, date)).await {
                    log::warn!("Failed to drop archive {} for {}: {}", date, feed, e);
                }
            }
        }

        log::info!("Rotated snapshot for {} ({})", feed, today);
        Ok(ArchiveFile {
            date: today,
            path: self.storage.path(&keys[0]),
        })
    }

    async fn commit(
        &self,
        [archive, previous, current, marker]: &[String; 4],
        old_current: &Option<Vec<u8>>,
        content: &str,
        today: NaiveDate,
    ) -> Result<()> {
        self.storage.write_bytes(archive, content.as_bytes()).await?;
        match old_current {
            Some(old) => self.storage.write_bytes(previous, old).await?,
            None => self.storage.remove(previous).await?,
        }
        self.storage.write_bytes(current, content.as_bytes()).await?;
        self.storage
            .write_bytes(marker, today.format(DATE_FORMAT).to_string().as_bytes())
            .await
    }

    async fn restore(&self, key: &str, bytes: Option<&[u8]>) {
        let restored = match bytes {
            Some(bytes) => self.storage.write_bytes(key, bytes).await,
            None => self.storage.remove(key).await,
        };
        if let Err(e) = restored {
            log::error!("Failed to restore {}: {}", key, e);
        }
    }

    async fn last_update(&self, feed: &Feed) -> Result<Option<NaiveDate>> {
        let Some(raw) = self.storage.read_string(&Self::key(feed, MARKER)).await? else {
            return Ok(None);
        };

        match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
            Ok(date) => Ok(Some(date)),
            Err(e) => {
                log::warn!("Ignoring unreadable update marker for {}: {}", feed, e);
                Ok(None)
            }
        }
    }

    async fn archive_dates(&self, feed: &Feed) -> Result<Vec<NaiveDate>> {
        let names = self.storage.list_files(&Self::key(feed, ARCHIVE_DIR)).await?;
        Ok(names
            .iter()
            .filter_map(|name| name.strip_suffix(".xml"))
            .filter_map(|stem| NaiveDate::parse_from_str(stem, DATE_FORMAT).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn setup() -> (TempDir, SnapshotStore, Feed) {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(LocalStorage::new(tmp.path()));
        let feed = Feed::parse("https://example.com/sitemap.xml").unwrap();
        (tmp, store, feed)
    }

    #[tokio::test]
    async fn test_read_missing_feed_is_empty() {
        let (_tmp, store, feed) = setup();
        assert_eq!(store.read(&feed).await.unwrap(), Snapshot::default());
        assert!(!store.already_updated(&feed, day(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_rotate_shifts_current_into_previous() {
        let (_tmp, store, feed) = setup();

        store.rotate(&feed, "v1", day(1)).await.unwrap();
        let snap = store.read(&feed).await.unwrap();
        assert_eq!(snap.current.as_deref(), Some("v1"));
        assert_eq!(snap.previous, None);
        assert_eq!(snap.last_update, Some(day(1)));

        store.rotate(&feed, "v2", day(2)).await.unwrap();
        let snap = store.read(&feed).await.unwrap();
        assert_eq!(snap.current.as_deref(), Some("v2"));
        assert_eq!(snap.previous.as_deref(), Some("v1"));
        assert!(store.already_updated(&feed, day(2)).await.unwrap());
        assert!(!store.already_updated(&feed, day(3)).await.unwrap());
    }

    #[tokio::test]
    async fn test_only_latest_archive_stays_live() {
        let (_tmp, store, feed) = setup();

        let first = store.rotate(&feed, "v1", day(1)).await.unwrap();
        assert!(first.path.exists());

        let second = store.rotate(&feed, "v2", day(2)).await.unwrap();
        assert!(!first.path.exists());
        assert!(second.path.exists());
        assert!(second.path.ends_with("archive/2026-03-02.xml"));
        assert_eq!(std::fs::read_to_string(&second.path).unwrap(), "v2");

        let snap = store.read(&feed).await.unwrap();
        assert_eq!(snap.archive, Some(second));
    }

    #[tokio::test]
    async fn test_consumed_archive_reads_as_none() {
        let (_tmp, store, feed) = setup();

        let archive = store.rotate(&feed, "v1", day(1)).await.unwrap();
        std::fs::remove_file(&archive.path).unwrap();

        let snap = store.read(&feed).await.unwrap();
        assert!(snap.archive.is_none());
        assert_eq!(snap.current.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_garbled_marker_is_ignored() {
        let (tmp, store, feed) = setup();
        store.rotate(&feed, "v1", day(1)).await.unwrap();

        let marker = tmp
            .path()
            .join("sitemaps")
            .join(feed.storage_key())
            .join("last_update");
        std::fs::write(marker, "yesterday-ish").unwrap();

        let snap = store.read(&feed).await.unwrap();
        assert_eq!(snap.last_update, None);
        assert_eq!(snap.current.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_failed_rotation_restores_snapshot() {
        let (tmp, store, feed) = setup();
        store.rotate(&feed, "v1", day(1)).await.unwrap();
        store.rotate(&feed, "v2", day(2)).await.unwrap();
        let before = store.read(&feed).await.unwrap();

        // The marker is the last file written; a directory in place of its
        // temp file makes that final write fail.
        let blocker = tmp
            .path()
            .join("sitemaps")
            .join(feed.storage_key())
            .join("last_update.tmp");
        std::fs::create_dir(&blocker).unwrap();

        assert!(store.rotate(&feed, "v3", day(3)).await.is_err());
        assert_eq!(store.read(&feed).await.unwrap(), before);

        std::fs::remove_dir(&blocker).unwrap();
        store.rotate(&feed, "v3", day(3)).await.unwrap();
        let snap = store.read(&feed).await.unwrap();
        assert_eq!(snap.current.as_deref(), Some("v3"));
        assert_eq!(snap.previous.as_deref(), Some("v2"));
        assert_eq!(snap.archive.map(|a| a.date), Some(day(3)));
    }

    #[tokio::test]
    async fn test_feeds_are_isolated() {
        let (_tmp, store, feed) = setup();
        let other = Feed::parse("https://example.com/other.xml").unwrap();

        store.rotate(&feed, "mine", day(1)).await.unwrap();
        assert_eq!(store.read(&other).await.unwrap(), Snapshot::default());
    }
}
