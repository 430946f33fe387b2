//! The secure data format contract and the full-payload baseline.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use cs_crypto::{DataProtector, ProtectionError};

use crate::error::{StateError, StateResult};
use crate::properties::AuthenticationProperties;
use crate::serializer::{BinaryPropertiesSerializer, PropertiesSerializer};

/// Turns a value into an opaque, URL-safe token and back.
///
/// `purpose`, when given, narrows the protector so that a token produced
/// for one purpose only opens for the same purpose.
#[async_trait]
pub trait SecureDataFormat<T: Send + Sync>: Send + Sync {
    /// Produces a token for `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized, stored or protected.
    async fn protect(&self, data: &T, purpose: Option<&str>) -> StateResult<String>;

    /// Recovers the value behind `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not authentic for this format and
    /// purpose, or if the value behind it cannot be recovered.
    async fn unprotect(&self, token: &str, purpose: Option<&str>) -> StateResult<T>;
}

/// Narrows `protector` by `purpose`, or returns it unchanged.
pub(crate) fn scoped(
    protector: &Arc<dyn DataProtector>,
    purpose: Option<&str>,
) -> Arc<dyn DataProtector> {
    match purpose {
        Some(purpose) => protector.create_protector(purpose),
        None => Arc::clone(protector),
    }
}

/// Encrypts the whole serialized properties into the token.
///
/// This is the behavior the cached codec replaces: tokens grow with the
/// properties. It needs no shared storage, so it is kept for single-node
/// deployments and for size comparisons.
pub struct ProtectedPropertiesFormat {
    protector: Arc<dyn DataProtector>,
    serializer: Arc<dyn PropertiesSerializer>,
}

impl ProtectedPropertiesFormat {
    /// Creates a format using the binary serializer.
    #[must_use]
    pub fn new(protector: Arc<dyn DataProtector>) -> Self {
        Self {
            protector,
            serializer: Arc::new(BinaryPropertiesSerializer),
        }
    }

    /// Replaces the serializer.
    #[must_use]
    pub fn with_serializer(mut self, serializer: Arc<dyn PropertiesSerializer>) -> Self {
        self.serializer = serializer;
        self
    }
}

#[async_trait]
impl SecureDataFormat<AuthenticationProperties> for ProtectedPropertiesFormat {
    async fn protect(
        &self,
        data: &AuthenticationProperties,
        purpose: Option<&str>,
    ) -> StateResult<String> {
        let bytes = self
            .serializer
            .serialize(data)
            .map_err(StateError::SerializationFailed)?;
        let protected = scoped(&self.protector, purpose)
            .protect(&bytes)
            .map_err(StateError::ProtectionFailed)?;
        Ok(encode_token(&protected))
    }

    async fn unprotect(
        &self,
        token: &str,
        purpose: Option<&str>,
    ) -> StateResult<AuthenticationProperties> {
        let protected = decode_token(token)?;
        let bytes = scoped(&self.protector, purpose)
            .unprotect(&protected)
            .map_err(StateError::DecryptionFailed)?;
        self.serializer
            .deserialize(&bytes)
            .map_err(StateError::DeserializationFailed)
    }
}

fn encode_token(bytes: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn decode_token(token: &str) -> StateResult<Vec<u8>> {
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| StateError::DecryptionFailed(ProtectionError::Encoding(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_crypto::{DataProtectionProvider, KeyRing};

    fn format() -> ProtectedPropertiesFormat {
        let provider = DataProtectionProvider::new(Arc::new(KeyRing::generate()));
        ProtectedPropertiesFormat::new(Arc::new(provider.create_protector("test")))
    }

    fn props() -> AuthenticationProperties {
        AuthenticationProperties::new()
            .with_item(".redirect", "https://app.example.com/")
            .with_item("OpenIdConnect.Code.RedirectUri", "https://app.example.com/signin-oidc")
    }

    #[tokio::test]
    async fn round_trip() {
        let format = format();
        let token = format.protect(&props(), None).await.unwrap();
        assert_eq!(format.unprotect(&token, None).await.unwrap(), props());
    }

    #[tokio::test]
    async fn token_grows_with_properties() {
        let format = format();
        let small = format.protect(&props(), None).await.unwrap();
        let big = format
            .protect(&props().with_item("extra", "y".repeat(500)), None)
            .await
            .unwrap();
        assert!(big.len() > small.len() + 500);
    }

    #[tokio::test]
    async fn purpose_mismatch_is_rejected() {
        let format = format();
        let token = format.protect(&props(), Some("a")).await.unwrap();
        assert!(matches!(
            format.unprotect(&token, Some("b")).await,
            Err(StateError::DecryptionFailed(ProtectionError::Authentication))
        ));
        assert!(matches!(
            format.unprotect(&token, None).await,
            Err(StateError::DecryptionFailed(_))
        ));
    }

    #[tokio::test]
    async fn not_base64_is_rejected() {
        assert!(matches!(
            format().unprotect("***", None).await,
            Err(StateError::DecryptionFailed(ProtectionError::Encoding(_)))
        ));
    }
}
