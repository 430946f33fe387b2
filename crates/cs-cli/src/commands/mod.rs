//! Command implementations.

pub mod config;
pub mod key;
pub mod state;

pub use config::run_config;
pub use key::run_key;
pub use state::run_state;

use std::sync::Arc;

use cs_cache::{DistributedCache, MemoryCache};
use cs_cache_redis::RedisCache;
use cs_crypto::DataProtectionProvider;
use cs_state::StateCodec;

use crate::config::{Backend, CliConfig};

/// Opens the cache backend selected by args or config.
pub async fn open_cache(
    config: &CliConfig,
    backend_override: Option<Backend>,
    redis_url: Option<&str>,
) -> crate::CliResult<Arc<dyn DistributedCache>> {
    match config.effective_backend(backend_override) {
        Backend::Memory => {
            tracing::debug!("using in-process cache");
            Ok(Arc::new(MemoryCache::new()))
        }
        Backend::Redis => {
            let redis = config.effective_redis(redis_url)?;
            tracing::debug!(host = %redis.host, port = redis.port, "connecting to Redis");
            Ok(Arc::new(RedisCache::new(redis).await?))
        }
    }
}

/// Builds a protection provider over the configured key ring.
pub fn protection_provider(config: &CliConfig) -> crate::CliResult<DataProtectionProvider> {
    Ok(DataProtectionProvider::new(Arc::new(config.key_ring()?)))
}

/// Builds the state codec from configuration.
pub fn build_codec(
    config: &CliConfig,
    provider: &DataProtectionProvider,
    cache: Arc<dyn DistributedCache>,
) -> StateCodec {
    StateCodec::from_provider(cache, provider, config.state.clone())
}
