//! # cs-crypto
//!
//! Data protection for cached-state using aws-lc-rs.
//!
//! A [`DataProtector`] turns short plaintexts into authenticated ciphertexts
//! that can only be opened by a protector with the same key ring and the same
//! purpose chain. Purposes isolate contexts: a payload protected for the
//! `oidc` scheme cannot be replayed against another scheme.
//!
//! ## Algorithms
//!
//! - AES-256-GCM for authenticated encryption
//! - HKDF with SHA-384 to derive one subkey per (key, purpose chain)
//!
//! SHA-256 is not used anywhere in key derivation.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod key_ring;
pub mod protector;
pub mod random;

pub use error::{ProtectionError, ProtectionResult};
pub use key_ring::{KeyRing, ProtectionKey, KEY_LEN};
pub use protector::{AeadProtector, DataProtectionProvider, DataProtector};
pub use random::{generate_state_id, random_base64url, random_bytes};
