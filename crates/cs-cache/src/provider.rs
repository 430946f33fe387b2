//! Distributed cache trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheResult;

/// Per-entry storage options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryOptions {
    /// Time to live, relative to the write.
    ///
    /// `None` leaves expiry to the backend's defaults.
    pub ttl: Option<Duration>,
}

impl EntryOptions {
    /// Options with no explicit expiry.
    #[must_use]
    pub const fn none() -> Self {
        Self { ttl: None }
    }

    /// Options that expire the entry `ttl` after it is written.
    #[must_use]
    pub const fn expires_in(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }
}

/// Byte-oriented distributed cache.
///
/// Implementations must be thread-safe and support concurrent access to
/// independent keys. Values are opaque bytes; callers serialize.
#[async_trait]
pub trait DistributedCache: Send + Sync {
    /// Gets a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Stores a value, replacing any existing entry under `key`.
    async fn set(&self, key: &str, value: &[u8], options: EntryOptions) -> CacheResult<()>;

    /// Removes a value from the cache.
    ///
    /// Returns `Ok(())` even if the key doesn't exist.
    async fn remove(&self, key: &str) -> CacheResult<()>;

    /// Checks if a live entry exists for `key`.
    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Gets and removes a value.
    ///
    /// Backends with an atomic primitive (e.g. `GETDEL`) should override
    /// this so two concurrent readers cannot both observe the value.
    async fn take(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let value = self.get(key).await?;
        if value.is_some() {
            self.remove(key).await?;
        }
        Ok(value)
    }
}

#[async_trait]
impl<C: DistributedCache + ?Sized> DistributedCache for std::sync::Arc<C> {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], options: EntryOptions) -> CacheResult<()> {
        (**self).set(key, value, options).await
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        (**self).remove(key).await
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        (**self).exists(key).await
    }

    async fn take(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        (**self).take(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_options_constructors() {
        assert_eq!(EntryOptions::none().ttl, None);
        assert_eq!(EntryOptions::default(), EntryOptions::none());
        assert_eq!(
            EntryOptions::expires_in(Duration::from_secs(30)).ttl,
            Some(Duration::from_secs(30))
        );
    }
}
