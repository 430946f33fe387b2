//! Serializers turning [`AuthenticationProperties`] into bytes and back.
//!
//! The codec only needs a pair of pure functions. Three implementations
//! are provided:
//!
//! - [`BinaryPropertiesSerializer`] - compact length-prefixed format (default)
//! - [`JsonPropertiesSerializer`] - human-readable, easy to inspect in Redis
//! - [`FnSerializer`] - wraps an arbitrary closure pair

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::properties::AuthenticationProperties;

/// Format version written by the built-in serializers.
pub const FORMAT_VERSION: i32 = 1;

/// Errors from serializing or deserializing properties.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializerError {
    /// The payload was written with an unsupported format version.
    #[error("unsupported properties format version {0}")]
    UnsupportedVersion(i32),

    /// The payload ended before all declared data was read.
    #[error("properties payload is truncated")]
    Truncated,

    /// A declared count or length is negative or out of range.
    #[error("invalid length in properties payload")]
    InvalidLength,

    /// A string is not valid UTF-8.
    #[error("properties payload contains invalid UTF-8")]
    InvalidUtf8,

    /// Bytes remain after the declared content.
    #[error("{0} trailing bytes after properties payload")]
    TrailingBytes(usize),

    /// JSON encoding or decoding failed.
    #[error("json: {0}")]
    Json(String),

    /// A custom serializer failed.
    #[error("{0}")]
    Custom(String),
}

/// Result type for serializer operations.
pub type SerializerResult<T> = Result<T, SerializerError>;

/// Converts properties to bytes and back.
///
/// Implementations must be deterministic inverses:
/// `deserialize(serialize(p)?)? == p` for all `p`.
pub trait PropertiesSerializer: Send + Sync {
    /// Serializes properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the properties cannot be represented.
    fn serialize(&self, properties: &AuthenticationProperties) -> SerializerResult<Vec<u8>>;

    /// Deserializes properties.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not a payload this serializer wrote.
    fn deserialize(&self, bytes: &[u8]) -> SerializerResult<AuthenticationProperties>;
}

/// Compact binary serializer.
///
/// Layout, all integers little-endian:
///
/// ```text
/// i32 version (1)
/// i32 item count
/// repeat count: string key, string value
/// ```
///
/// Each string is a 7-bit variable-length byte count followed by UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryPropertiesSerializer;

impl BinaryPropertiesSerializer {
    /// Creates a binary serializer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PropertiesSerializer for BinaryPropertiesSerializer {
    fn serialize(&self, properties: &AuthenticationProperties) -> SerializerResult<Vec<u8>> {
        let items = properties.items();
        let count = i32::try_from(items.len()).map_err(|_| SerializerError::InvalidLength)?;

        let mut out = Vec::with_capacity(
            8 + items
                .iter()
                .map(|(k, v)| k.len() + v.len() + 2)
                .sum::<usize>(),
        );
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        for (key, value) in items {
            write_string(&mut out, key)?;
            write_string(&mut out, value)?;
        }
        Ok(out)
    }

    fn deserialize(&self, bytes: &[u8]) -> SerializerResult<AuthenticationProperties> {
        let mut reader = Reader::new(bytes);

        let version = reader.read_i32()?;
        if version != FORMAT_VERSION {
            return Err(SerializerError::UnsupportedVersion(version));
        }

        let count = usize::try_from(reader.read_i32()?).map_err(|_| SerializerError::InvalidLength)?;
        let mut items = BTreeMap::new();
        for _ in 0..count {
            let key = reader.read_string()?;
            let value = reader.read_string()?;
            items.insert(key, value);
        }

        match reader.remaining() {
            0 => Ok(AuthenticationProperties::from_items(items)),
            n => Err(SerializerError::TrailingBytes(n)),
        }
    }
}

fn write_string(out: &mut Vec<u8>, value: &str) -> SerializerResult<()> {
    let len = u32::try_from(value.len()).map_err(|_| SerializerError::InvalidLength)?;
    write_7bit(out, len);
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

fn write_7bit(out: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        #[allow(clippy::cast_possible_truncation)]
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    #[allow(clippy::cast_possible_truncation)]
    out.push(value as u8);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    const fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> SerializerResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(SerializerError::Truncated);
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_i32(&mut self) -> SerializerResult<i32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(i32::from_le_bytes(buf))
    }

    fn read_7bit(&mut self) -> SerializerResult<u32> {
        let mut result: u32 = 0;
        for shift in (0..35).step_by(7) {
            let byte = self.take(1)?[0];
            let chunk = u32::from(byte & 0x7F);
            // The fifth byte may only carry the top four bits.
            if shift == 28 && chunk > 0x0F {
                return Err(SerializerError::InvalidLength);
            }
            result |= chunk << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(SerializerError::InvalidLength)
    }

    fn read_string(&mut self) -> SerializerResult<String> {
        let len = usize::try_from(self.read_7bit()?).map_err(|_| SerializerError::InvalidLength)?;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| SerializerError::InvalidUtf8)
    }
}

/// JSON serializer.
///
/// Writes `{"version":1,"items":{...}}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPropertiesSerializer;

impl JsonPropertiesSerializer {
    /// Creates a JSON serializer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
struct JsonEnvelopeRef<'a> {
    version: i32,
    items: &'a BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct JsonEnvelope {
    version: i32,
    items: BTreeMap<String, String>,
}

impl PropertiesSerializer for JsonPropertiesSerializer {
    fn serialize(&self, properties: &AuthenticationProperties) -> SerializerResult<Vec<u8>> {
        serde_json::to_vec(&JsonEnvelopeRef {
            version: FORMAT_VERSION,
            items: properties.items(),
        })
        .map_err(|e| SerializerError::Json(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> SerializerResult<AuthenticationProperties> {
        let envelope: JsonEnvelope =
            serde_json::from_slice(bytes).map_err(|e| SerializerError::Json(e.to_string()))?;
        if envelope.version != FORMAT_VERSION {
            return Err(SerializerError::UnsupportedVersion(envelope.version));
        }
        Ok(AuthenticationProperties::from_items(envelope.items))
    }
}

/// Serializer built from a pair of closures.
pub struct FnSerializer<S, D> {
    serialize: S,
    deserialize: D,
}

impl<S, D> FnSerializer<S, D>
where
    S: Fn(&AuthenticationProperties) -> SerializerResult<Vec<u8>> + Send + Sync,
    D: Fn(&[u8]) -> SerializerResult<AuthenticationProperties> + Send + Sync,
{
    /// Creates a serializer from `serialize` and its inverse `deserialize`.
    pub const fn new(serialize: S, deserialize: D) -> Self {
        Self {
            serialize,
            deserialize,
        }
    }
}

impl<S, D> fmt::Debug for FnSerializer<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSerializer").finish_non_exhaustive()
    }
}

impl<S, D> PropertiesSerializer for FnSerializer<S, D>
where
    S: Fn(&AuthenticationProperties) -> SerializerResult<Vec<u8>> + Send + Sync,
    D: Fn(&[u8]) -> SerializerResult<AuthenticationProperties> + Send + Sync,
{
    fn serialize(&self, properties: &AuthenticationProperties) -> SerializerResult<Vec<u8>> {
        (self.serialize)(properties)
    }

    fn deserialize(&self, bytes: &[u8]) -> SerializerResult<AuthenticationProperties> {
        (self.deserialize)(bytes)
    }
}
