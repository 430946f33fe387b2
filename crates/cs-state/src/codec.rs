//! Cache-backed state codec.
//!
//! The OpenID Connect `state` parameter has to carry the authentication
//! properties through the identity provider and back. Encrypting them
//! wholesale produces tokens that grow with the properties and eventually
//! break URL or header limits. This codec instead stores the serialized
//! properties in a [`DistributedCache`] under a random identifier and only
//! protects the identifier, so every token has the same short length.
//!
//! ```text
//! encode:  properties -> serialize -> cache.set(prefix + id) -> protect(id)  -> token
//! decode:  token      -> unprotect -> id -> cache.get/take(prefix + id) -> deserialize
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use cs_cache::{DistributedCache, EntryOptions};
use cs_crypto::{generate_state_id, DataProtectionProvider, DataProtector, ProtectionError};
use uuid::Uuid;

use crate::config::{ReadPolicy, StateCodecConfig};
use crate::error::{StateError, StateResult};
use crate::format::{scoped, SecureDataFormat};
use crate::properties::AuthenticationProperties;
use crate::serializer::{BinaryPropertiesSerializer, PropertiesSerializer};

/// The state codec.
pub type StateCodec = CachedPropertiesFormat;

/// Secure data format that keeps properties in a distributed cache and puts
/// only a protected identifier in the token.
///
/// Instances hold nothing but shared handles to immutable collaborators and
/// can be shared across tasks freely.
pub struct CachedPropertiesFormat {
    cache: Arc<dyn DistributedCache>,
    protector: Arc<dyn DataProtector>,
    serializer: Arc<dyn PropertiesSerializer>,
    config: StateCodecConfig,
}

impl CachedPropertiesFormat {
    /// Creates a codec around an already scoped protector.
    ///
    /// `protector` is used as given; `config.purposes` is not applied.
    #[must_use]
    pub fn new(
        cache: Arc<dyn DistributedCache>,
        protector: Arc<dyn DataProtector>,
        config: StateCodecConfig,
    ) -> Self {
        Self {
            cache,
            protector,
            serializer: Arc::new(BinaryPropertiesSerializer),
            config,
        }
    }

    /// Creates a codec whose protector is scoped to `config.purposes`.
    #[must_use]
    pub fn from_provider(
        cache: Arc<dyn DistributedCache>,
        provider: &DataProtectionProvider,
        config: StateCodecConfig,
    ) -> Self {
        let protector = Arc::new(provider.create_protector_chain(&config.purposes));
        Self::new(cache, protector, config)
    }

    /// Replaces the properties serializer.
    #[must_use]
    pub fn with_serializer(mut self, serializer: Arc<dyn PropertiesSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &StateCodecConfig {
        &self.config
    }

    /// Stores `properties` and returns an opaque token pointing at them.
    ///
    /// # Errors
    ///
    /// - [`StateError::SerializationFailed`] if the serializer rejects the properties
    /// - [`StateError::CacheUnavailable`] if the cache write fails
    /// - [`StateError::ProtectionFailed`] if the identifier cannot be protected
    pub async fn encode(
        &self,
        properties: &AuthenticationProperties,
        purpose: Option<&str>,
    ) -> StateResult<String> {
        let id = generate_state_id().hyphenated().to_string();

        let bytes = self
            .serializer
            .serialize(properties)
            .map_err(StateError::SerializationFailed)?;

        let options = EntryOptions {
            ttl: self.config.ttl(),
        };
        self.cache
            .set(&self.config.cache_key(&id), &bytes, options)
            .await
            .map_err(StateError::CacheUnavailable)?;

        scoped(&self.protector, purpose)
            .protect_str(&id)
            .map_err(StateError::ProtectionFailed)
    }

    /// Recovers the properties behind `token`.
    ///
    /// Under [`ReadPolicy::Consume`] the cache entry is removed atomically
    /// with the read, so a token decodes at most once.
    ///
    /// # Errors
    ///
    /// - [`StateError::DecryptionFailed`] if the token is malformed, tampered
    ///   with, protected for another purpose or under an unknown key
    /// - [`StateError::CacheUnavailable`] if the cache read fails
    /// - [`StateError::CacheMiss`] if the entry expired or was already consumed
    /// - [`StateError::DeserializationFailed`] if the cached bytes are corrupt
    pub async fn decode(
        &self,
        token: &str,
        purpose: Option<&str>,
    ) -> StateResult<AuthenticationProperties> {
        let id = scoped(&self.protector, purpose)
            .unprotect_str(token)
            .map_err(StateError::DecryptionFailed)?;
        if Uuid::try_parse(&id).is_err() {
            return Err(StateError::DecryptionFailed(ProtectionError::MalformedPayload));
        }

        let key = self.config.cache_key(&id);
        let cached = match self.config.read_policy {
            ReadPolicy::Retain => self.cache.get(&key).await,
            ReadPolicy::Consume => self.cache.take(&key).await,
        }
        .map_err(StateError::CacheUnavailable)?;

        let bytes = cached.ok_or(StateError::CacheMiss { key })?;
        self.serializer
            .deserialize(&bytes)
            .map_err(StateError::DeserializationFailed)
    }
}

#[async_trait]
impl SecureDataFormat<AuthenticationProperties> for CachedPropertiesFormat {
    async fn protect(
        &self,
        data: &AuthenticationProperties,
        purpose: Option<&str>,
    ) -> StateResult<String> {
        self.encode(data, purpose).await
    }

    async fn unprotect(
        &self,
        token: &str,
        purpose: Option<&str>,
    ) -> StateResult<AuthenticationProperties> {
        self.decode(token, purpose).await
    }
}
