//! Common test utilities and fixtures.

use std::sync::Arc;

use cs_cache::DistributedCache;
use cs_cache_redis::{RedisCache, RedisConfig};
use cs_crypto::{DataProtectionProvider, KeyRing};
use cs_state::{StateCodec, StateCodecConfig};
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::redis::{Redis, REDIS_PORT};

/// Test environment holding a Redis container.
pub struct TestEnv {
    /// Redis container; stopped on drop.
    _redis: ContainerAsync<Redis>,
    /// Connection settings for the container.
    pub redis_config: RedisConfig,
}

impl TestEnv {
    /// Starts an ephemeral Redis.
    pub async fn new() -> anyhow::Result<Self> {
        // Initialize tracing for tests
        let _ = tracing_subscriber::fmt()
            .with_env_filter("cs_cache_redis=debug")
            .try_init();

        let redis = Redis::default().start().await?;
        let host = redis.get_host().await?.to_string();
        let port = redis.get_host_port_ipv4(REDIS_PORT).await?;

        let redis_config = RedisConfig::new().host(host).port(port);
        Ok(Self {
            _redis: redis,
            redis_config,
        })
    }

    /// Connects a new cache client.
    pub async fn cache(&self) -> anyhow::Result<RedisCache> {
        Ok(RedisCache::new(self.redis_config.clone()).await?)
    }

    /// Connects a new cache client sharing nothing but the server.
    pub async fn shared_cache(&self) -> anyhow::Result<Arc<dyn DistributedCache>> {
        Ok(Arc::new(self.cache().await?))
    }
}

/// Builds a codec for the default scheme over `cache` and `ring`.
pub fn codec(cache: Arc<dyn DistributedCache>, ring: &Arc<KeyRing>) -> StateCodec {
    let provider = DataProtectionProvider::new(Arc::clone(ring));
    StateCodec::from_provider(cache, &provider, StateCodecConfig::default())
}
