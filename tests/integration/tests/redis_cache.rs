//! Redis cache backend tests.

use std::time::Duration;

use cs_cache::{DistributedCache, EntryOptions};
use cs_cache_redis::RedisCache;

use crate::common::TestEnv;

/// Tests basic set/get/remove against a real server.
#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_set_get_remove() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let cache = env.cache().await?;

    cache.set("k", b"\x00\x01binary\xff", EntryOptions::none()).await?;
    assert_eq!(cache.get("k").await?, Some(b"\x00\x01binary\xff".to_vec()));
    assert!(cache.exists("k").await?);

    cache.remove("k").await?;
    assert_eq!(cache.get("k").await?, None);
    assert!(!cache.exists("k").await?);

    // Removing again is fine
    cache.remove("k").await?;

    cache.close().await?;
    Ok(())
}

/// Tests that entries expire.
#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_entry_expiry() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let cache = env.cache().await?;

    cache
        .set("short", b"v", EntryOptions::expires_in(Duration::from_millis(300)))
        .await?;
    assert!(cache.exists("short").await?);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(cache.get("short").await?, None);
    Ok(())
}

/// Tests that take returns a value exactly once.
#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_take_is_single_use() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let cache = env.cache().await?;

    cache.set("once", b"v", EntryOptions::none()).await?;
    assert_eq!(cache.take("once").await?, Some(b"v".to_vec()));
    assert_eq!(cache.take("once").await?, None);
    Ok(())
}

/// Tests that the key prefix namespaces entries.
#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_key_prefix_isolates_clients() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let plain = env.cache().await?;
    let prefixed = RedisCache::new(env.redis_config.clone().key_prefix("app")).await?;

    prefixed.set("k", b"v", EntryOptions::none()).await?;
    assert_eq!(plain.get("k").await?, None);
    assert_eq!(plain.get("app:k").await?, Some(b"v".to_vec()));
    Ok(())
}
