//! Cryptographically secure random generation.
//!
//! This module provides secure random values for:
//! - State identifiers (cache-key suffixes)
//! - Protection key material
//! - AEAD nonces
//!
//! All functions use the thread-local CSPRNG.

use base64::Engine;
use rand::Rng;
use uuid::Uuid;

/// Generates a cryptographically secure random byte array.
///
/// # Arguments
///
/// * `len` - Number of random bytes to generate
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes[..]);
    bytes
}

/// Generates a URL-safe base64-encoded random string.
///
/// # Arguments
///
/// * `byte_len` - Number of random bytes (output will be ~4/3 this length)
#[must_use]
pub fn random_base64url(byte_len: usize) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes(byte_len))
}

/// Generates a fresh state identifier.
///
/// A version 4 UUID carries 122 random bits, so identifiers issued
/// concurrently never collide in practice. The hyphenated form is what
/// ends up in cache keys.
#[must_use]
pub fn generate_state_id() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_bytes_produces_correct_length() {
        assert_eq!(random_bytes(12).len(), 12);
        assert_eq!(random_bytes(32).len(), 32);
    }

    #[test]
    fn random_bytes_produces_different_values() {
        assert_ne!(random_bytes(32), random_bytes(32));
    }

    #[test]
    fn random_base64url_no_special_chars() {
        let s = random_base64url(32);
        // URL-safe base64 only contains alphanumeric, dash, and underscore
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(s.len(), 43);
    }

    #[test]
    fn generate_state_id_uniqueness() {
        let ids: HashSet<Uuid> = (0..1000).map(|_| generate_state_id()).collect();
        // All 1000 ids should be unique
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn generate_state_id_is_random_version() {
        assert_eq!(generate_state_id().get_version_num(), 4);
    }
}
