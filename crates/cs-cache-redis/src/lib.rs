//! # cs-cache-redis
//!
//! Redis cache implementation for cached-state.
//!
//! This crate provides Redis-based caching using the `fred` crate,
//! implementing the [`cs_cache::DistributedCache`] trait so that state
//! tokens issued by one instance can be decoded by any other.
//!
//! ## Features
//!
//! - Automatic reconnection with exponential backoff
//! - TLS support
//! - Optional key prefixing for shared Redis deployments
//! - Atomic single-use reads via `GETDEL`
//!
//! ## Example
//!
//! ```ignore
//! use cs_cache::{DistributedCache, EntryOptions};
//! use cs_cache_redis::{RedisCache, RedisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RedisConfig::default()
//!         .host("localhost")
//!         .port(6379);
//!
//!     let cache = RedisCache::new(config).await?;
//!
//!     cache.set("key", b"value", EntryOptions::none()).await?;
//!     let value = cache.get("key").await?;
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod provider;

pub use config::RedisConfig;
pub use provider::RedisCache;
