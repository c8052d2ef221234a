//! Inline base64 image blobs (`data:<mime>;base64,<payload>`).

use crate::error::{PostcraftError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An image encoded inline as text.
///
/// Serializes as the plain URI string so it can be dropped straight into an
/// `image_url` field or an `<img src>`.
#[derive(Clone, PartialEq, Eq)]
pub struct DataUri {
    mime_type: String,
    payload: String,
}

impl DataUri {
    /// Encodes raw bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload: BASE64_STANDARD.encode(bytes),
        }
    }

    /// Wraps an already base64-encoded payload, as returned by image endpoints.
    pub fn from_base64(mime_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload: payload.into(),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64_STANDARD
            .decode(self.payload.as_bytes())
            .map_err(|e| PostcraftError::validation(format!("invalid base64 image data: {e}")))
    }

    /// File extension matching the mime subtype (`image/png` -> `png`).
    pub fn extension(&self) -> &str {
        match self.mime_type.split_once('/') {
            Some((_, "jpeg")) => "jpg",
            Some((_, "svg+xml")) => "svg",
            Some((_, subtype)) if !subtype.is_empty() => subtype,
            _ => "bin",
        }
    }

    /// Size of the URI in bytes once rendered.
    pub fn len(&self) -> usize {
        "data:".len() + self.mime_type.len() + ";base64,".len() + self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}

// Payloads can be megabytes; keep Debug output readable.
impl fmt::Debug for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUri")
            .field("mime_type", &self.mime_type)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl FromStr for DataUri {
    type Err = PostcraftError;

    fn from_str(value: &str) -> Result<Self> {
        let rest = value
            .strip_prefix("data:")
            .ok_or_else(|| PostcraftError::validation("data URI must start with 'data:'"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| PostcraftError::validation("data URI is missing its payload"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| PostcraftError::validation("only base64 data URIs are supported"))?;
        if mime_type.is_empty() {
            return Err(PostcraftError::validation("data URI is missing its mime type"));
        }

        Ok(Self::from_base64(mime_type, payload))
    }
}

impl Serialize for DataUri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
