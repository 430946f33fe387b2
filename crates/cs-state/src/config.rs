//! State codec configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Prefix of every cache key written by the codec.
pub const CACHE_KEY_PREFIX: &str = "CachedPropertiesData-";

/// Default authentication scheme name.
pub const DEFAULT_SCHEME: &str = "oidc";

/// Default lifetime of a cached entry: long enough for a user to finish
/// signing in at the identity provider.
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(15 * 60);

/// Longest entry lifetime the codec will request (30 days).
pub const MAX_ENTRY_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// What decode does with the cache entry it read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadPolicy {
    /// Leave the entry in place; it lives until it expires.
    Retain,
    /// Atomically read and delete the entry, making tokens single-use.
    #[default]
    Consume,
}

impl ReadPolicy {
    /// Returns the policy name as used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retain => "retain",
            Self::Consume => "consume",
        }
    }
}

/// Configuration for a state codec instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateCodecConfig {
    /// Prefix prepended to the identifier to form the cache key.
    pub cache_prefix: String,

    /// Purpose chain the codec's protector is scoped to.
    pub purposes: Vec<String>,

    /// Entry lifetime in seconds; `None` leaves expiry to the cache.
    pub entry_ttl_secs: Option<u64>,

    /// What decode does with the entry it read.
    pub read_policy: ReadPolicy,
}

impl Default for StateCodecConfig {
    fn default() -> Self {
        Self::for_scheme(DEFAULT_SCHEME)
    }
}

impl StateCodecConfig {
    /// Creates the configuration used by the OpenID Connect handler for
    /// `scheme`.
    #[must_use]
    pub fn for_scheme(scheme: &str) -> Self {
        Self {
            cache_prefix: CACHE_KEY_PREFIX.to_string(),
            purposes: scheme_purposes(scheme),
            entry_ttl_secs: Some(DEFAULT_ENTRY_TTL.as_secs()),
            read_policy: ReadPolicy::default(),
        }
    }

    /// Sets the cache key prefix.
    #[must_use]
    pub fn cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    /// Replaces the purpose chain.
    #[must_use]
    pub fn purposes<S: Into<String>>(mut self, purposes: impl IntoIterator<Item = S>) -> Self {
        self.purposes = purposes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the entry lifetime; `None` leaves expiry to the cache.
    ///
    /// Sub-second lifetimes are rounded up to the next whole second.
    #[must_use]
    pub const fn entry_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.entry_ttl_secs = match ttl {
            Some(ttl) if ttl.subsec_nanos() > 0 => Some(ttl.as_secs().saturating_add(1)),
            Some(ttl) => Some(ttl.as_secs()),
            None => None,
        };
        self
    }

    /// Sets the read policy.
    #[must_use]
    pub const fn read_policy(mut self, policy: ReadPolicy) -> Self {
        self.read_policy = policy;
        self
    }

    /// Returns the entry lifetime, clamped to between one second and
    /// [`MAX_ENTRY_TTL`].
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.entry_ttl_secs
            .map(|secs| Duration::from_secs(secs.clamp(1, MAX_ENTRY_TTL.as_secs())))
    }

    /// Returns the cache key for a state identifier.
    #[must_use]
    pub fn cache_key(&self, id: &str) -> String {
        format!("{}{id}", self.cache_prefix)
    }
}

/// Returns the purpose chain the OpenID Connect handler uses for `scheme`.
#[must_use]
pub fn scheme_purposes(scheme: &str) -> Vec<String> {
    vec![
        "OpenIdConnectMiddleware".to_string(),
        "String".to_string(),
        scheme.to_string(),
        "v1".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StateCodecConfig::default();
        assert_eq!(config.cache_prefix, "CachedPropertiesData-");
        assert_eq!(
            config.purposes,
            ["OpenIdConnectMiddleware", "String", "oidc", "v1"]
        );
        assert_eq!(config.ttl(), Some(Duration::from_secs(900)));
        assert_eq!(config.read_policy, ReadPolicy::Consume);
    }

    #[test]
    fn cache_key_concatenates() {
        let config = StateCodecConfig::default();
        assert_eq!(
            config.cache_key("0b6f4c1e-1d2a-4c1b-9f0e-3c2d1b0a9f8e"),
            "CachedPropertiesData-0b6f4c1e-1d2a-4c1b-9f0e-3c2d1b0a9f8e"
        );
    }

    #[test]
    fn builder_setters() {
        let config = StateCodecConfig::for_scheme("corp")
            .cache_prefix("state:")
            .entry_ttl(None)
            .read_policy(ReadPolicy::Retain);
        assert_eq!(config.purposes[2], "corp");
        assert_eq!(config.cache_key("abc"), "state:abc");
        assert_eq!(config.ttl(), None);
        assert_eq!(config.read_policy.as_str(), "retain");

        let config = config.purposes(["a", "b"]);
        assert_eq!(config.purposes, ["a", "b"]);
    }

    #[test]
    fn sub_second_ttl_rounds_up() {
        let config = StateCodecConfig::default().entry_ttl(Some(Duration::from_millis(250)));
        assert_eq!(config.entry_ttl_secs, Some(1));
        assert_eq!(config.ttl(), Some(Duration::from_secs(1)));

        let config = config.entry_ttl(Some(Duration::from_millis(1500)));
        assert_eq!(config.ttl(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn out_of_range_ttl_is_clamped() {
        let config: StateCodecConfig = toml::from_str("entry_ttl_secs = 0").unwrap();
        assert_eq!(config.ttl(), Some(Duration::from_secs(1)));

        let config: StateCodecConfig =
            toml::from_str("entry_ttl_secs = 9223372036854775807").unwrap();
        assert_eq!(config.ttl(), Some(MAX_ENTRY_TTL));
    }

    #[test]
    fn deserializes_partial_toml() {
        let config: StateCodecConfig = toml::from_str(
            r#"
            read_policy = "retain"
            entry_ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.read_policy, ReadPolicy::Retain);
        assert_eq!(config.ttl(), Some(Duration::from_secs(60)));
        assert_eq!(config.cache_prefix, CACHE_KEY_PREFIX);
    }
}
