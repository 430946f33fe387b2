//! In-process cache backend.
//!
//! Suitable for single-instance deployments and tests. Entries expire lazily
//! on read and are swept by [`spawn_purge_task`]. For load-balanced
//! deployments use a shared backend such as Redis, otherwise a state token
//! issued by one node cannot be decoded by another.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::interval;

use crate::error::CacheResult;
use crate::provider::{DistributedCache, EntryOptions};

/// Default purge interval (5 minutes).
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-memory distributed cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    default_ttl: Option<Duration>,
}

impl MemoryCache {
    /// Creates an empty cache with no default expiry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache that applies `ttl` to entries written without one.
    #[must_use]
    pub fn with_default_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl: Some(ttl),
        }
    }

    /// Returns the number of stored entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    fn live_value(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it so it is not counted until the next sweep.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        None
    }
}

#[async_trait]
impl DistributedCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.live_value(key))
    }

    async fn set(&self, key: &str, value: &[u8], options: EntryOptions) -> CacheResult<()> {
        let ttl = options.ttl.or(self.default_ttl);
        // A deadline past what `Instant` can represent never expires.
        let entry = Entry {
            value: value.to_vec(),
            expires_at: ttl.and_then(|ttl| Instant::now().checked_add(ttl)),
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = Instant::now();
        let removed = self.entries.write().remove(key);
        Ok(removed
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value))
    }
}

/// Spawns a background task that periodically purges expired entries.
///
/// Returns a `JoinHandle` that can be used to abort the task.
pub fn spawn_purge_task(
    cache: Arc<MemoryCache>,
    purge_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(purge_interval);

        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let purged = cache.purge_expired();
            if purged > 0 {
                tracing::info!(purged, remaining = cache.len(), "Memory cache purge completed");
            } else {
                tracing::debug!(entries = cache.len(), "Memory cache purge: nothing expired");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_and_get() {
        let cache = MemoryCache::new();
        cache.set("k", b"value", EntryOptions::none()).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(b"value".to_vec()));
        assert!(cache.exists("k").await.unwrap());
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_replaces_existing_value() {
        let cache = MemoryCache::new();
        cache.set("k", b"one", EntryOptions::none()).await.unwrap();
        cache.set("k", b"two", EntryOptions::none()).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let cache = MemoryCache::new();
        cache.set("k", b"v", EntryOptions::none()).await.unwrap();

        cache.remove("k").await.unwrap();
        cache.remove("k").await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn take_returns_value_once() {
        let cache = MemoryCache::new();
        cache.set("k", b"v", EntryOptions::none()).await.unwrap();

        assert_eq!(cache.take("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(cache.take("k").await.unwrap(), None);
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn entries_expire() {
        let cache = MemoryCache::new();
        cache
            .set("short", b"v", EntryOptions::expires_in(Duration::from_millis(20)))
            .await
            .unwrap();
        cache.set("long", b"v", EntryOptions::none()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get("short").await.unwrap(), None);
        assert_eq!(cache.take("short").await.unwrap(), None);
        assert!(cache.get("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unrepresentable_ttl_never_expires() {
        let cache = MemoryCache::new();
        cache
            .set("k", b"v", EntryOptions::expires_in(Duration::from_secs(u64::MAX)))
            .await
            .unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(cache.purge_expired(), 0);
    }

    #[tokio::test]
    async fn default_ttl_applies_when_entry_has_none() {
        let cache = MemoryCache::with_default_ttl(Duration::from_millis(20));
        cache.set("k", b"v", EntryOptions::none()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn purge_drops_only_expired_entries() {
        let cache = MemoryCache::new();
        cache
            .set("a", b"v", EntryOptions::expires_in(Duration::from_millis(10)))
            .await
            .unwrap();
        cache
            .set("b", b"v", EntryOptions::expires_in(Duration::from_millis(10)))
            .await
            .unwrap();
        cache.set("c", b"v", EntryOptions::none()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn purge_task_runs() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .set("gone", b"v", EntryOptions::expires_in(Duration::from_millis(10)))
            .await
            .unwrap();
        cache.set("kept", b"v", EntryOptions::none()).await.unwrap();

        let handle = spawn_purge_task(Arc::clone(&cache), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();

        assert_eq!(cache.len(), 1, "expired entry should be swept");
    }

    #[tokio::test]
    async fn works_through_arc() {
        let cache: Arc<dyn DistributedCache> = Arc::new(MemoryCache::new());
        cache.set("k", b"v", EntryOptions::none()).await.unwrap();
        assert_eq!(cache.take("k").await.unwrap(), Some(b"v".to_vec()));
    }
}
