//! Non-fatal diagnostics raised while building a message tree.

use serde::Serialize;
use thiserror::Error;

/// Something in the input was off, but parsing carried on.
///
/// Each warning is logged through `tracing` when it occurs and also
/// collected on the parse result.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ParseWarning {
    /// The transfer encoding is not one we decode; the body was kept as-is.
    #[error("unrecognized transfer encoding '{0}', body passed through")]
    UnknownEncoding(String),

    /// Base64 input was malformed; decoding was best effort.
    #[error("malformed base64 body: {0}")]
    InvalidBase64(String),

    /// Quoted-printable input could not be decoded; the body was kept as-is.
    #[error("malformed quoted-printable body: {0}")]
    InvalidQuotedPrintable(String),

    /// A multipart body had no delimiter line for its boundary.
    #[error("no delimiter found for multipart boundary '{0}'")]
    MissingBoundary(String),
}
