//! Data protection error types.

use thiserror::Error;

/// Errors that can occur while protecting or unprotecting data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtectionError {
    /// Key material is missing or has the wrong shape.
    #[error("invalid protection key: {0}")]
    InvalidKey(String),

    /// The protected payload is too short or has an unknown version.
    #[error("malformed protected payload")]
    MalformedPayload,

    /// The payload names a key that is not in the key ring.
    #[error("unknown protection key: {0}")]
    UnknownKey(u32),

    /// The payload names a key that has been revoked.
    #[error("protection key {0} has been revoked")]
    KeyRevoked(u32),

    /// Authentication failed (tampered payload or mismatched purpose).
    #[error("payload authentication failed")]
    Authentication,

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Text encoding of the payload or plaintext is invalid.
    #[error("invalid encoding: {0}")]
    Encoding(String),
}

/// Result type for data protection operations.
pub type ProtectionResult<T> = Result<T, ProtectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_error_is_generic() {
        // Don't leak information about why authentication failed
        assert_eq!(
            ProtectionError::Authentication.to_string(),
            "payload authentication failed"
        );
    }

    #[test]
    fn key_errors_name_the_key() {
        assert!(ProtectionError::UnknownKey(7).to_string().contains('7'));
        assert!(ProtectionError::KeyRevoked(3).to_string().contains("revoked"));
    }
}
