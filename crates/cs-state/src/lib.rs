//! # cs-state
//!
//! Compact OpenID Connect `state` tokens backed by a distributed cache.
//!
//! [`StateCodec`] serializes [`AuthenticationProperties`], stores the bytes
//! in a [`cs_cache::DistributedCache`] under a random identifier, and hands
//! back only the protected identifier. Tokens stay short regardless of how
//! much the properties hold, and any instance sharing the cache and key ring
//! can decode them.
//!
//! [`ProtectedPropertiesFormat`] is the cache-less alternative that encrypts
//! the whole payload into the token.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cs_cache::MemoryCache;
//! use cs_crypto::{DataProtectionProvider, KeyRing};
//! use cs_state::{AuthenticationProperties, StateCodec, StateCodecConfig};
//!
//! let provider = DataProtectionProvider::new(Arc::new(KeyRing::generate()));
//! let codec = StateCodec::from_provider(
//!     Arc::new(MemoryCache::new()),
//!     &provider,
//!     StateCodecConfig::for_scheme("oidc"),
//! );
//!
//! let props = AuthenticationProperties::new().with_item(".redirect", "/home");
//! let token = codec.encode(&props, None).await?;
//! assert_eq!(codec.decode(&token, None).await?, props);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod properties;
pub mod serializer;

pub use codec::{CachedPropertiesFormat, StateCodec};
pub use config::{
    scheme_purposes, ReadPolicy, StateCodecConfig, CACHE_KEY_PREFIX, DEFAULT_ENTRY_TTL,
    DEFAULT_SCHEME, MAX_ENTRY_TTL,
};
pub use error::{StateError, StateResult};
pub use format::{ProtectedPropertiesFormat, SecureDataFormat};
pub use properties::{keys, AuthenticationProperties};
pub use serializer::{
    BinaryPropertiesSerializer, FnSerializer, JsonPropertiesSerializer, PropertiesSerializer,
    SerializerError, SerializerResult, FORMAT_VERSION,
};
