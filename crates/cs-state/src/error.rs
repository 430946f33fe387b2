//! State codec error types.

use cs_cache::CacheError;
use cs_crypto::ProtectionError;
use thiserror::Error;

use crate::serializer::SerializerError;

/// Errors produced while encoding or decoding a state token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The cache could not be reached or failed the operation.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(#[source] CacheError),

    /// The token opened but its entry is gone (expired, evicted or consumed).
    #[error("no cached state for {key}")]
    CacheMiss {
        /// Cache key the token pointed at.
        key: String,
    },

    /// The token could not be authenticated and decrypted.
    #[error("state token rejected: {0}")]
    DecryptionFailed(#[source] ProtectionError),

    /// Protecting a fresh identifier failed.
    #[error("state token protection failed: {0}")]
    ProtectionFailed(#[source] ProtectionError),

    /// The properties could not be serialized.
    #[error("properties serialization failed: {0}")]
    SerializationFailed(#[source] SerializerError),

    /// The cached bytes could not be deserialized.
    #[error("cached properties are corrupt: {0}")]
    DeserializationFailed(#[source] SerializerError),
}

impl StateError {
    /// Returns true if the entry was simply not found.
    ///
    /// Callers usually turn this into a "sign-in expired, start again" page.
    #[must_use]
    pub const fn is_cache_miss(&self) -> bool {
        matches!(self, Self::CacheMiss { .. })
    }

    /// Returns true if retrying the same operation later may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::CacheUnavailable(e) => e.is_unavailable(),
            _ => false,
        }
    }
}

/// Result type for state codec operations.
pub type StateResult<T> = Result<T, StateError>;
