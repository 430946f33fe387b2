//! # cs-cache
//!
//! Distributed cache contract for cached-state.
//!
//! This crate defines the byte-oriented key-value interface the state codec
//! stores authentication properties in. Backends own serialization-free
//! storage, expiry and concurrency; callers only see `get`/`set`/`remove`.
//!
//! ## Backends
//!
//! - [`MemoryCache`] - In-process store with TTL expiry (single instance, tests)
//! - `cs-cache-redis` - Redis-backed store for load-balanced deployments
//!
//! ## Example
//!
//! ```ignore
//! use cs_cache::{DistributedCache, EntryOptions, MemoryCache};
//! use std::time::Duration;
//!
//! async fn remember(cache: &impl DistributedCache) -> cs_cache::CacheResult<()> {
//!     cache
//!         .set("greeting", b"hello", EntryOptions::expires_in(Duration::from_secs(60)))
//!         .await
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod memory;
pub mod provider;

pub use error::{CacheError, CacheResult};
pub use memory::{spawn_purge_task, MemoryCache, DEFAULT_PURGE_INTERVAL};
pub use provider::{DistributedCache, EntryOptions};
