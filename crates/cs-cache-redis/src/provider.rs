//! Redis cache provider implementation.

use async_trait::async_trait;
use cs_cache::{CacheError, CacheResult, DistributedCache, EntryOptions};
use fred::prelude::*;
use fred::types::Value;

use crate::config::RedisConfig;
use crate::error::from_redis_error;

/// Redis-based distributed cache.
pub struct RedisCache {
    client: Client,
    config: RedisConfig,
}

impl RedisCache {
    /// Creates a new Redis cache and waits for the initial connection.
    ///
    /// ## Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn new(config: RedisConfig) -> CacheResult<Self> {
        let redis_config = Config::from_url(&config.connection_url())
            .map_err(|e| CacheError::Configuration(e.to_string()))?;

        let performance = PerformanceConfig {
            default_command_timeout: config.command_timeout_duration(),
            ..PerformanceConfig::default()
        };
        let connection = ConnectionConfig {
            connection_timeout: config.connect_timeout(),
            ..ConnectionConfig::default()
        };

        let client = Client::new(
            redis_config,
            Some(performance),
            Some(connection),
            Some(ReconnectPolicy::new_exponential(0, 1000, 30_000, 2)),
        );

        client.init().await.map_err(from_redis_error)?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = config.database,
            "Connected to Redis cache"
        );

        Ok(Self { client, config })
    }

    /// Returns the underlying Redis client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the configuration this cache was created with.
    #[must_use]
    pub const fn config(&self) -> &RedisConfig {
        &self.config
    }

    /// Closes the connection.
    ///
    /// ## Errors
    ///
    /// Returns an error if the `QUIT` command fails.
    pub async fn close(&self) -> CacheResult<()> {
        self.client.quit().await.map_err(from_redis_error)
    }

    /// Formats a key with the configured prefix.
    fn key(&self, key: &str) -> String {
        self.config.prefixed_key(key)
    }
}

/// Converts to i64 for Redis expiration, saturating instead of wrapping.
fn saturating_i64(value: impl TryInto<i64>) -> i64 {
    value.try_into().unwrap_or(i64::MAX)
}

/// Maps entry options to a Redis expiration, rounding sub-second TTLs up.
fn expiration(options: EntryOptions) -> Option<Expiration> {
    options.ttl.map(|ttl| {
        if ttl.subsec_nanos() == 0 {
            Expiration::EX(saturating_i64(ttl.as_secs().max(1)))
        } else {
            Expiration::PX(saturating_i64(ttl.as_millis().max(1)))
        }
    })
}

/// Extracts raw bytes from a Redis reply.
fn into_bytes(value: Value) -> CacheResult<Option<Vec<u8>>> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_bytes()
        .map(|bytes| Some(bytes.to_vec()))
        .ok_or_else(|| CacheError::Internal(format!("unexpected Redis reply: {value:?}")))
}

#[async_trait]
impl DistributedCache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let key = self.key(key);
        let value: Value = self.client.get(&key).await.map_err(from_redis_error)?;
        into_bytes(value)
    }

    async fn set(&self, key: &str, value: &[u8], options: EntryOptions) -> CacheResult<()> {
        let key = self.key(key);
        self.client
            .set::<(), _, _>(
                &key,
                Value::Bytes(value.to_vec().into()),
                expiration(options),
                None,
                false,
            )
            .await
            .map_err(from_redis_error)
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        let key = self.key(key);
        self.client
            .del::<(), _>(&key)
            .await
            .map_err(from_redis_error)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let key = self.key(key);
        let count: i64 = self.client.exists(&key).await.map_err(from_redis_error)?;
        Ok(count > 0)
    }

    async fn take(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let key = self.key(key);
        let value: Value = self.client.getdel(&key).await.map_err(from_redis_error)?;
        into_bytes(value)
    }
}
