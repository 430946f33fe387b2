//! CLI error types.

use cs_cache::CacheError;
use cs_crypto::ProtectionError;
use cs_state::StateError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Cache backend error.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// State codec error.
    #[error("{0}")]
    State(#[from] StateError),

    /// Crypto error.
    #[error("crypto error: {0}")]
    Crypto(#[from] ProtectionError),

    /// A round trip did not reproduce its input.
    #[error("verification failed: {0}")]
    Verification(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
