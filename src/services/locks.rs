// src/services/locks.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per key.
///
/// Holders of the same key run one at a time; different keys never contend.
/// An entry nobody holds or waits on is dropped on the next `lock` call, so
/// the map only tracks keys that are in use.
#[derive(Debug, Default)]
pub struct KeyedLock {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|k, slot| k == key || Arc::strong_count(slot) > 1);
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        slot.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_waits_for_release() {
        let locks = KeyedLock::new();
        let guard = locks.lock("a").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock("a")).await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired = tokio::time::timeout(Duration::from_millis(50), locks.lock("a")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn different_keys_do_not_contend() {
        let locks = KeyedLock::new();
        let _a = locks.lock("a").await;

        let b = tokio::time::timeout(Duration::from_millis(50), locks.lock("b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn idle_keys_are_dropped() {
        let locks = KeyedLock::new();
        for key in ["a", "b", "c"] {
            drop(locks.lock(key).await);
        }
        let held = locks.lock("d").await;

        let keys: Vec<String> = locks.locks.lock().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["d".to_string()]);
        drop(held);
    }
}
