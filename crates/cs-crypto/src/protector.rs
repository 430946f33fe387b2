//! Purpose-scoped authenticated encryption.
//!
//! ## Payload layout
//!
//! ```text
//! version (1) | key id (4, big endian) | nonce (12) | ciphertext | tag (16)
//! ```
//!
//! The 5-byte header is bound as associated data. The AES-256-GCM key is
//! derived per payload key and purpose chain with HKDF-SHA-384, so a
//! payload only opens under the exact chain it was sealed with.

use std::sync::Arc;

use aws_lc_rs::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use aws_lc_rs::hkdf::{KeyType, Salt, HKDF_SHA384};
use aws_lc_rs::rand::{SecureRandom, SystemRandom};
use base64::Engine;

use crate::error::{ProtectionError, ProtectionResult};
use crate::key_ring::{KeyRing, ProtectionKey, KEY_LEN};

/// Current payload format version.
const PAYLOAD_VERSION: u8 = 1;

/// Version byte plus key id.
const HEADER_LEN: usize = 5;

/// AES-GCM authentication tag length.
const TAG_LEN: usize = 16;

/// Encrypts and authenticates data for a specific purpose chain.
///
/// Implementations must be thread-safe; a protector is typically created
/// once at startup and shared.
pub trait DataProtector: Send + Sync {
    /// Protects `plaintext`, returning the binary payload.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable key is available or encryption fails.
    fn protect(&self, plaintext: &[u8]) -> ProtectionResult<Vec<u8>>;

    /// Verifies and decrypts a payload produced by [`DataProtector::protect`].
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is malformed, was tampered with,
    /// was sealed under another purpose chain, or names an unknown or
    /// revoked key.
    fn unprotect(&self, protected: &[u8]) -> ProtectionResult<Vec<u8>>;

    /// Creates a child protector whose purpose chain is extended by `purpose`.
    fn create_protector(&self, purpose: &str) -> Arc<dyn DataProtector>;

    /// Returns the purpose chain of this protector.
    fn purposes(&self) -> &[String];

    /// Protects a string and returns URL-safe base64 (no padding).
    ///
    /// # Errors
    ///
    /// See [`DataProtector::protect`].
    fn protect_str(&self, plaintext: &str) -> ProtectionResult<String> {
        let protected = self.protect(plaintext.as_bytes())?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(protected))
    }

    /// Reverses [`DataProtector::protect_str`].
    ///
    /// # Errors
    ///
    /// Returns [`ProtectionError::Encoding`] for invalid base64 or a
    /// non-UTF-8 plaintext, otherwise see [`DataProtector::unprotect`].
    fn unprotect_str(&self, protected: &str) -> ProtectionResult<String> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(protected)
            .map_err(|e| ProtectionError::Encoding(e.to_string()))?;
        let plaintext = self.unprotect(&bytes)?;
        String::from_utf8(plaintext).map_err(|e| ProtectionError::Encoding(e.to_string()))
    }
}

/// Root factory for protectors sharing one key ring.
#[derive(Debug, Clone)]
pub struct DataProtectionProvider {
    ring: Arc<KeyRing>,
}

impl DataProtectionProvider {
    /// Creates a provider over a key ring.
    #[must_use]
    pub const fn new(ring: Arc<KeyRing>) -> Self {
        Self { ring }
    }

    /// Creates a protector with a single-element purpose chain.
    #[must_use]
    pub fn create_protector(&self, purpose: &str) -> AeadProtector {
        AeadProtector {
            ring: Arc::clone(&self.ring),
            purposes: vec![purpose.to_string()],
        }
    }

    /// Creates a protector with the given purpose chain.
    #[must_use]
    pub fn create_protector_chain<S: AsRef<str>>(&self, purposes: &[S]) -> AeadProtector {
        AeadProtector {
            ring: Arc::clone(&self.ring),
            purposes: purposes.iter().map(|p| p.as_ref().to_string()).collect(),
        }
    }

    /// Returns the key ring.
    #[must_use]
    pub fn key_ring(&self) -> &KeyRing {
        &self.ring
    }
}

/// AES-256-GCM protector bound to a purpose chain.
#[derive(Debug, Clone)]
pub struct AeadProtector {
    ring: Arc<KeyRing>,
    purposes: Vec<String>,
}

impl AeadProtector {
    /// Returns a copy of this protector with `purpose` appended to the chain.
    #[must_use]
    pub fn narrow(&self, purpose: &str) -> Self {
        let mut purposes = self.purposes.clone();
        purposes.push(purpose.to_string());
        Self {
            ring: Arc::clone(&self.ring),
            purposes,
        }
    }
}

impl DataProtector for AeadProtector {
    fn protect(&self, plaintext: &[u8]) -> ProtectionResult<Vec<u8>> {
        let key = self.ring.default_key()?;
        let sealing_key = derive_key(key, &self.purposes)?;

        let mut nonce = [0u8; NONCE_LEN];
        SystemRandom::new()
            .fill(&mut nonce)
            .map_err(|e| ProtectionError::Encryption(format!("nonce generation failed: {e}")))?;

        let header = header(key.id());
        let mut in_out = plaintext.to_vec();
        sealing_key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce),
                Aad::from(header),
                &mut in_out,
            )
            .map_err(|e| ProtectionError::Encryption(e.to_string()))?;

        let mut payload = Vec::with_capacity(HEADER_LEN + NONCE_LEN + in_out.len());
        payload.extend_from_slice(&header);
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&in_out);
        Ok(payload)
    }

    fn unprotect(&self, protected: &[u8]) -> ProtectionResult<Vec<u8>> {
        if protected.len() < HEADER_LEN + NONCE_LEN + TAG_LEN
            || protected[0] != PAYLOAD_VERSION
        {
            return Err(ProtectionError::MalformedPayload);
        }

        let (header, rest) = protected.split_at(HEADER_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let id_bytes: [u8; 4] = header[1..]
            .try_into()
            .map_err(|_| ProtectionError::MalformedPayload)?;
        let key_id = u32::from_be_bytes(id_bytes);

        let key = self
            .ring
            .get(key_id)
            .ok_or(ProtectionError::UnknownKey(key_id))?;
        if key.is_revoked() {
            return Err(ProtectionError::KeyRevoked(key_id));
        }

        let opening_key = derive_key(key, &self.purposes)?;
        let nonce = Nonce::try_assume_unique_for_key(nonce)
            .map_err(|_| ProtectionError::MalformedPayload)?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = opening_key
            .open_in_place(nonce, Aad::from(header), &mut in_out)
            .map_err(|_| ProtectionError::Authentication)?;
        Ok(plaintext.to_vec())
    }

    fn create_protector(&self, purpose: &str) -> Arc<dyn DataProtector> {
        Arc::new(self.narrow(purpose))
    }

    fn purposes(&self) -> &[String] {
        &self.purposes
    }
}

/// HKDF output length marker for AES-256 subkeys.
struct SubkeyLen;

impl KeyType for SubkeyLen {
    fn len(&self) -> usize {
        KEY_LEN
    }
}

fn header(key_id: u32) -> [u8; HEADER_LEN] {
    let id = key_id.to_be_bytes();
    [PAYLOAD_VERSION, id[0], id[1], id[2], id[3]]
}

/// Length-prefixes each purpose so `["ab", "c"]` and `["a", "bc"]` differ.
fn encode_purposes(purposes: &[String]) -> Vec<u8> {
    let mut info = Vec::new();
    for purpose in purposes {
        #[allow(clippy::cast_possible_truncation)]
        let len = purpose.len() as u32;
        info.extend_from_slice(&len.to_be_bytes());
        info.extend_from_slice(purpose.as_bytes());
    }
    info
}

fn derive_key(key: &ProtectionKey, purposes: &[String]) -> ProtectionResult<LessSafeKey> {
    let salt = Salt::new(HKDF_SHA384, &key.id().to_be_bytes());
    let prk = salt.extract(key.material());

    let info = encode_purposes(purposes);
    let info_parts = [info.as_slice()];
    let okm = prk
        .expand(&info_parts, SubkeyLen)
        .map_err(|_| ProtectionError::InvalidKey("subkey derivation failed".to_string()))?;

    let mut subkey = [0u8; KEY_LEN];
    okm.fill(&mut subkey)
        .map_err(|_| ProtectionError::InvalidKey("subkey derivation failed".to_string()))?;

    let unbound = UnboundKey::new(&AES_256_GCM, &subkey)
        .map_err(|_| ProtectionError::InvalidKey("invalid AES-256 key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}
