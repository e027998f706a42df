//! Decoded attachment payloads.

use serde::{Deserialize, Serialize};

/// An attachment taken from a `Content-Disposition: attachment` segment.
///
/// `data` always holds the decoded bytes, never the base64 or
/// quoted-printable transport form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Filename from the `filename="…"` disposition parameter.
    pub filename: String,

    /// Bare MIME type from `Content-Type` (e.g. `"application/pdf"`), if declared.
    pub content_type: Option<String>,

    /// Decoded payload.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Attachment {
    /// Decoded size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// The declared content type, or `application/octet-stream` when missing.
    pub fn mime_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

/// Attachment bytes travel as standard base64 in serialized output.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
