//! End-to-End Integration Tests
//!
//! These tests run the cache backend and the state codec against an
//! ephemeral Redis started with testcontainers. They need Docker and are
//! ignored by default; run them with `cargo test -- --ignored`.

mod common;
mod redis_cache;
mod state_codec;
