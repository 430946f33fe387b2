//! Protection keys and key rings.
//!
//! A key ring holds every key that may still open an outstanding payload.
//! Exactly one non-revoked key is the default and is used for new payloads;
//! rotating adds a fresh default while older keys keep decrypting.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use chrono::{DateTime, Utc};

use crate::error::{ProtectionError, ProtectionResult};
use crate::random::random_bytes;

/// Length of protection key material in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// A single protection key.
#[derive(Clone)]
pub struct ProtectionKey {
    id: u32,
    material: [u8; KEY_LEN],
    created_at: DateTime<Utc>,
    revoked: bool,
}

impl ProtectionKey {
    /// Generates a new random key.
    #[must_use]
    pub fn generate(id: u32) -> Self {
        let mut material = [0u8; KEY_LEN];
        material.copy_from_slice(&random_bytes(KEY_LEN));
        Self::from_material(id, material)
    }

    /// Creates a key from raw material.
    #[must_use]
    pub fn from_material(id: u32, material: [u8; KEY_LEN]) -> Self {
        Self {
            id,
            material,
            created_at: Utc::now(),
            revoked: false,
        }
    }

    /// Creates a key from standard base64-encoded material.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not base64 or not exactly 32 bytes.
    pub fn from_base64(id: u32, encoded: &str) -> ProtectionResult<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| ProtectionError::InvalidKey(format!("key {id}: {e}")))?;

        let material: [u8; KEY_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            ProtectionError::InvalidKey(format!(
                "key {id}: expected {KEY_LEN} bytes, got {}",
                b.len()
            ))
        })?;

        Ok(Self::from_material(id, material))
    }

    /// Encodes the key material as standard base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.material)
    }

    /// Returns the key ID.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Returns when this key object was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true if the key may no longer open payloads.
    #[must_use]
    pub const fn is_revoked(&self) -> bool {
        self.revoked
    }

    pub(crate) const fn material(&self) -> &[u8; KEY_LEN] {
        &self.material
    }
}

impl fmt::Debug for ProtectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectionKey")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("revoked", &self.revoked)
            .finish_non_exhaustive()
    }
}

/// Set of protection keys with a designated default.
#[derive(Debug, Clone)]
pub struct KeyRing {
    keys: BTreeMap<u32, ProtectionKey>,
    default_key_id: u32,
}

impl KeyRing {
    /// Creates a key ring with a single freshly generated key (id 1).
    #[must_use]
    pub fn generate() -> Self {
        let key = ProtectionKey::generate(1);
        let mut keys = BTreeMap::new();
        keys.insert(1, key);
        Self {
            keys,
            default_key_id: 1,
        }
    }

    /// Builds a key ring from existing keys.
    ///
    /// # Errors
    ///
    /// Returns an error if `keys` is empty, contains duplicate IDs, or the
    /// default key is missing or revoked.
    pub fn from_keys(keys: Vec<ProtectionKey>, default_key_id: u32) -> ProtectionResult<Self> {
        if keys.is_empty() {
            return Err(ProtectionError::InvalidKey("key ring is empty".to_string()));
        }

        let mut map = BTreeMap::new();
        for key in keys {
            let id = key.id;
            if map.insert(id, key).is_some() {
                return Err(ProtectionError::InvalidKey(format!("duplicate key id {id}")));
            }
        }

        let ring = Self {
            keys: map,
            default_key_id,
        };
        ring.default_key()?;
        Ok(ring)
    }

    /// Adds a key, optionally making it the default.
    ///
    /// # Errors
    ///
    /// Returns an error if a key with the same ID already exists, or if a
    /// revoked key is made the default.
    pub fn add_key(&mut self, key: ProtectionKey, make_default: bool) -> ProtectionResult<()> {
        let id = key.id;
        if self.keys.contains_key(&id) {
            return Err(ProtectionError::InvalidKey(format!("duplicate key id {id}")));
        }
        if make_default && key.revoked {
            return Err(ProtectionError::KeyRevoked(id));
        }
        self.keys.insert(id, key);
        if make_default {
            self.default_key_id = id;
        }
        Ok(())
    }

    /// Generates a new default key and returns its ID.
    ///
    /// Existing keys stay in the ring so outstanding payloads still open.
    ///
    /// # Errors
    ///
    /// Returns an error if the highest key ID is already `u32::MAX`.
    pub fn rotate(&mut self) -> ProtectionResult<u32> {
        let id = match self.keys.keys().next_back() {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| ProtectionError::InvalidKey("key ids exhausted".to_string()))?,
            None => 1,
        };
        self.keys.insert(id, ProtectionKey::generate(id));
        self.default_key_id = id;
        Ok(id)
    }

    /// Revokes a key so payloads protected with it no longer open.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or is the current default.
    pub fn revoke(&mut self, id: u32) -> ProtectionResult<()> {
        if id == self.default_key_id {
            return Err(ProtectionError::InvalidKey(
                "cannot revoke the default key; rotate first".to_string(),
            ));
        }
        let key = self
            .keys
            .get_mut(&id)
            .ok_or(ProtectionError::UnknownKey(id))?;
        key.revoked = true;
        Ok(())
    }

    /// Gets a key by ID.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&ProtectionKey> {
        self.keys.get(&id)
    }

    /// Returns the key used for new payloads.
    ///
    /// # Errors
    ///
    /// Returns an error if the default key is missing or revoked.
    pub fn default_key(&self) -> ProtectionResult<&ProtectionKey> {
        let key = self
            .keys
            .get(&self.default_key_id)
            .ok_or(ProtectionError::UnknownKey(self.default_key_id))?;
        if key.revoked {
            return Err(ProtectionError::KeyRevoked(key.id));
        }
        Ok(key)
    }

    /// Returns the default key ID.
    #[must_use]
    pub const fn default_key_id(&self) -> u32 {
        self.default_key_id
    }

    /// Returns all key IDs in ascending order.
    #[must_use]
    pub fn key_ids(&self) -> Vec<u32> {
        self.keys.keys().copied().collect()
    }

    /// Returns the number of keys in the ring.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the ring has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ring_has_one_default_key() {
        let ring = KeyRing::generate();
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.default_key().unwrap().id(), 1);
    }

    #[test]
    fn base64_round_trip() {
        let key = ProtectionKey::generate(4);
        let restored = ProtectionKey::from_base64(4, &key.to_base64()).unwrap();
        assert_eq!(restored.material(), key.material());
    }

    #[test]
    fn base64_rejects_wrong_length() {
        let short = base64::engine::general_purpose::STANDARD.encode([0u8; 16]);
        assert!(matches!(
            ProtectionKey::from_base64(1, &short),
            Err(ProtectionError::InvalidKey(_))
        ));
        assert!(ProtectionKey::from_base64(1, "not base64!").is_err());
    }

    #[test]
    fn debug_hides_material() {
        let key = ProtectionKey::from_material(9, [0xAB; KEY_LEN]);
        let debug = format!("{key:?}");
        assert!(debug.contains("id: 9"));
        assert!(!debug.contains("material"));
    }

    #[test]
    fn from_keys_validation() {
        assert!(KeyRing::from_keys(vec![], 1).is_err());
        assert!(KeyRing::from_keys(
            vec![ProtectionKey::generate(1), ProtectionKey::generate(1)],
            1
        )
        .is_err());
        assert!(matches!(
            KeyRing::from_keys(vec![ProtectionKey::generate(1)], 2),
            Err(ProtectionError::UnknownKey(2))
        ));

        let ring =
            KeyRing::from_keys(vec![ProtectionKey::generate(1), ProtectionKey::generate(2)], 2)
                .unwrap();
        assert_eq!(ring.default_key_id(), 2);
        assert_eq!(ring.key_ids(), vec![1, 2]);
    }

    #[test]
    fn rotate_adds_new_default() {
        let mut ring = KeyRing::generate();
        let new_id = ring.rotate().unwrap();
        assert_eq!(new_id, 2);
        assert_eq!(ring.default_key_id(), 2);
        assert!(ring.get(1).is_some());
    }

    #[test]
    fn rotate_fails_when_ids_are_exhausted() {
        let mut ring =
            KeyRing::from_keys(vec![ProtectionKey::generate(u32::MAX)], u32::MAX).unwrap();
        assert!(matches!(ring.rotate(), Err(ProtectionError::InvalidKey(_))));
        assert_eq!(ring.default_key_id(), u32::MAX);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn revoke_rules() {
        let mut ring = KeyRing::generate();
        assert!(ring.revoke(1).is_err(), "default key cannot be revoked");

        ring.rotate().unwrap();
        ring.revoke(1).unwrap();
        assert!(ring.get(1).unwrap().is_revoked());
        assert!(matches!(ring.revoke(42), Err(ProtectionError::UnknownKey(42))));
    }

    #[test]
    fn add_key_rejects_duplicates() {
        let mut ring = KeyRing::generate();
        assert!(ring.add_key(ProtectionKey::generate(1), false).is_err());
        ring.add_key(ProtectionKey::generate(5), true).unwrap();
        assert_eq!(ring.default_key_id(), 5);
    }
}
