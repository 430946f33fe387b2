//! Authentication properties carried through the `state` parameter.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Well-known item keys used by the OpenID Connect layer.
pub mod keys {
    /// URL to return to once the sign-in completes.
    pub const REDIRECT_URI: &str = ".redirect";
    /// When the authentication was issued (RFC 3339).
    pub const ISSUED_UTC: &str = ".issued";
    /// When the authentication expires (RFC 3339).
    pub const EXPIRES_UTC: &str = ".expires";
    /// Whether the resulting session survives browser restarts.
    pub const IS_PERSISTENT: &str = ".persistent";
    /// Whether the session may be refreshed.
    pub const ALLOW_REFRESH: &str = ".refresh";
}

/// String-to-string properties produced and consumed by the protocol layer.
///
/// The state codec never interprets the items; the accessors below are
/// conveniences over well-known keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationProperties {
    items: BTreeMap<String, String>,
}

impl AuthenticationProperties {
    /// Creates empty properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates properties from an existing item map.
    #[must_use]
    pub const fn from_items(items: BTreeMap<String, String>) -> Self {
        Self { items }
    }

    /// Returns all items.
    #[must_use]
    pub const fn items(&self) -> &BTreeMap<String, String> {
        &self.items
    }

    /// Consumes the properties and returns the item map.
    #[must_use]
    pub fn into_items(self) -> BTreeMap<String, String> {
        self.items
    }

    /// Gets an item.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    /// Sets an item, or removes it when `value` is `None`.
    pub fn set(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match value {
            Some(value) => {
                self.items.insert(key, value);
            }
            None => {
                self.items.remove(&key);
            }
        }
    }

    /// Inserts an item, builder style.
    #[must_use]
    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.insert(key.into(), value.into());
        self
    }

    /// Removes an item, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.items.remove(key)
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the post-sign-in redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> Option<&str> {
        self.get(keys::REDIRECT_URI)
    }

    /// Sets the post-sign-in redirect URI.
    pub fn set_redirect_uri(&mut self, uri: Option<String>) {
        self.set(keys::REDIRECT_URI, uri);
    }

    /// Returns the issue time, if present and well-formed.
    #[must_use]
    pub fn issued_utc(&self) -> Option<DateTime<Utc>> {
        self.get_date(keys::ISSUED_UTC)
    }

    /// Sets the issue time.
    pub fn set_issued_utc(&mut self, at: Option<DateTime<Utc>>) {
        self.set_date(keys::ISSUED_UTC, at);
    }

    /// Returns the expiry time, if present and well-formed.
    #[must_use]
    pub fn expires_utc(&self) -> Option<DateTime<Utc>> {
        self.get_date(keys::EXPIRES_UTC)
    }

    /// Sets the expiry time.
    pub fn set_expires_utc(&mut self, at: Option<DateTime<Utc>>) {
        self.set_date(keys::EXPIRES_UTC, at);
    }

    /// Returns true if the session should persist.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.get(keys::IS_PERSISTENT).is_some()
    }

    /// Marks the session persistent or not.
    pub fn set_is_persistent(&mut self, persistent: bool) {
        self.set(keys::IS_PERSISTENT, persistent.then(String::new));
    }

    /// Returns whether refresh is allowed, if specified.
    #[must_use]
    pub fn allow_refresh(&self) -> Option<bool> {
        self.get(keys::ALLOW_REFRESH)
            .and_then(|v| v.parse::<bool>().ok())
    }

    /// Sets whether refresh is allowed.
    pub fn set_allow_refresh(&mut self, allow: Option<bool>) {
        self.set(keys::ALLOW_REFRESH, allow.map(|a| a.to_string()));
    }

    fn get_date(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn set_date(&mut self, key: &str, at: Option<DateTime<Utc>>) {
        self.set(
            key,
            at.map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AuthenticationProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            items: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
