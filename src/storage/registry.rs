//! Persisted list of watched feeds (`feeds.json`).

use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::Feed;
use crate::storage::LocalStorage;

const REGISTRY_KEY: &str = "feeds.json";

/// Ordered, duplicate-free set of watched feeds.
///
/// Every mutation is persisted before the in-memory list changes, so a
/// failed write leaves both untouched.
#[derive(Debug)]
pub struct FeedRegistry {
    storage: LocalStorage,
    feeds: Mutex<Vec<Feed>>,
}

impl FeedRegistry {
    /// Load the registry from storage. A missing file is an empty registry.
    pub async fn open(storage: LocalStorage) -> Result<Self> {
        let raw: Vec<String> = storage.read_json(REGISTRY_KEY).await?.unwrap_or_default();

        let mut feeds: Vec<Feed> = Vec::with_capacity(raw.len());
        for entry in raw {
            match Feed::parse(&entry) {
                Ok(feed) if !feeds.contains(&feed) => feeds.push(feed),
                Ok(_) => log::warn!("Skipping duplicate registry entry {}", entry),
                Err(e) => log::warn!("Skipping invalid registry entry {}: {}", entry, e),
            }
        }
        log::debug!("Loaded {} feeds from {}", feeds.len(), REGISTRY_KEY);

        Ok(Self {
            storage,
            feeds: Mutex::new(feeds),
        })
    }

    /// All feeds in insertion order.
    pub async fn list(&self) -> Vec<Feed> {
        self.feeds.lock().await.clone()
    }

    pub async fn contains(&self, feed: &Feed) -> bool {
        self.feeds.lock().await.contains(feed)
    }

    /// Append a feed. Returns false if it is already registered.
    pub async fn add(&self, feed: &Feed) -> Result<bool> {
        let mut feeds = self.feeds.lock().await;
        if feeds.contains(feed) {
            return Ok(false);
        }

        let mut next = feeds.clone();
        next.push(feed.clone());
        self.storage.write_json(REGISTRY_KEY, &next).await?;
        *feeds = next;
        Ok(true)
    }

    /// Remove a feed. Returns false if it was not registered.
    ///
    /// Stored snapshots are left in place.
    pub async fn remove(&self, feed: &Feed) -> Result<bool> {
        let mut feeds = self.feeds.lock().await;
        if !feeds.contains(feed) {
            return Ok(false);
        }

        let next: Vec<Feed> = feeds.iter().filter(|f| *f != feed).cloned().collect();
        self.storage.write_json(REGISTRY_KEY, &next).await?;
        *feeds = next;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn feed(path: &str) -> Feed {
        Feed::parse(&format!("https://example.com/{path}")).unwrap()
    }

    #[tokio::test]
    async fn test_add_keeps_order_and_rejects_duplicates() {
        let tmp = TempDir::new().unwrap();
        let registry = FeedRegistry::open(LocalStorage::new(tmp.path())).await.unwrap();

        assert!(registry.add(&feed("b.xml")).await.unwrap());
        assert!(registry.add(&feed("a.xml")).await.unwrap());
        assert!(!registry.add(&feed("b.xml")).await.unwrap());

        assert_eq!(registry.list().await, vec![feed("b.xml"), feed("a.xml")]);
    }

    #[tokio::test]
    async fn test_remove_missing_leaves_registry_unchanged() {
        let tmp = TempDir::new().unwrap();
        let registry = FeedRegistry::open(LocalStorage::new(tmp.path())).await.unwrap();
        registry.add(&feed("a.xml")).await.unwrap();

        assert!(!registry.remove(&feed("never.xml")).await.unwrap());
        assert_eq!(registry.list().await, vec![feed("a.xml")]);

        assert!(registry.remove(&feed("a.xml")).await.unwrap());
        assert!(registry.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let registry = FeedRegistry::open(LocalStorage::new(tmp.path())).await.unwrap();
            registry.add(&feed("a.xml")).await.unwrap();
            registry.add(&feed("b.xml")).await.unwrap();
            registry.remove(&feed("a.xml")).await.unwrap();
        }

        let raw = std::fs::read_to_string(tmp.path().join("feeds.json")).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec!["https://example.com/b.xml"]);

        let reopened = FeedRegistry::open(LocalStorage::new(tmp.path())).await.unwrap();
        assert_eq!(reopened.list().await, vec![feed("b.xml")]);
    }

    #[tokio::test]
    async fn test_open_skips_bad_and_duplicate_entries() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("feeds.json"),
            r#"["https://example.com/a.xml", "nonsense", "https://EXAMPLE.com/a.xml"]"#,
        )
        .unwrap();

        let registry = FeedRegistry::open(LocalStorage::new(tmp.path())).await.unwrap();
        assert_eq!(registry.list().await, vec![feed("a.xml")]);
    }
}
