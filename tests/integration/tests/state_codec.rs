//! State codec tests over a shared Redis.

use std::sync::Arc;

use cs_cache::DistributedCache;
use cs_crypto::KeyRing;
use cs_state::{AuthenticationProperties, ReadPolicy, StateCodec, StateCodecConfig, StateError};

use crate::common::{codec, TestEnv};

fn sign_in_properties() -> AuthenticationProperties {
    let mut props = AuthenticationProperties::new()
        .with_item("OpenIdConnect.Code.RedirectUri", "https://app.example.com/signin-oidc")
        .with_item("returnUrl", "/reports?year=2024");
    props.set_redirect_uri(Some("https://app.example.com/".to_string()));
    props
}

/// Tests that a token issued by one instance decodes on another.
#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_token_decodes_on_another_instance() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let ring = Arc::new(KeyRing::generate());

    let issuer = codec(env.shared_cache().await?, &ring);
    let receiver = codec(env.shared_cache().await?, &ring);

    let token = issuer.encode(&sign_in_properties(), None).await?;
    assert_eq!(receiver.decode(&token, None).await?, sign_in_properties());
    Ok(())
}

/// Tests single-use tokens across instances.
#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_consumed_token_is_rejected_everywhere() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let ring = Arc::new(KeyRing::generate());
    let first = codec(env.shared_cache().await?, &ring);
    let second = codec(env.shared_cache().await?, &ring);

    let token = first.encode(&sign_in_properties(), None).await?;
    first.decode(&token, None).await?;

    match second.decode(&token, None).await {
        Err(StateError::CacheMiss { .. }) => Ok(()),
        other => anyhow::bail!("expected cache miss, got {other:?}"),
    }
}

/// Tests replay-tolerant decoding.
#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_retain_policy_over_redis() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let provider = cs_crypto::DataProtectionProvider::new(Arc::new(KeyRing::generate()));
    let cache: Arc<dyn DistributedCache> = env.shared_cache().await?;
    let state = StateCodec::from_provider(
        cache,
        &provider,
        StateCodecConfig::default().read_policy(ReadPolicy::Retain),
    );

    let token = state.encode(&sign_in_properties(), Some("tenant")).await?;
    state.decode(&token, Some("tenant")).await?;
    assert_eq!(state.decode(&token, Some("tenant")).await?, sign_in_properties());
    Ok(())
}
