//! Reversing Content-Transfer-Encoding and acknowledging declared charsets.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use tracing::warn;

use crate::model::headers::HeaderMap;
use crate::parser::classify;
use crate::parser::warning::ParseWarning;

/// Accepts missing or partial padding, as real-world bodies often have it.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// A declared `Content-Transfer-Encoding`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEncoding {
    /// Absent, `7bit`, `8bit` or `binary`: nothing to undo.
    Identity,
    Base64,
    QuotedPrintable,
    Unknown(String),
}

impl TransferEncoding {
    /// Read the encoding from a segment's headers (case-insensitive).
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get("content-transfer-encoding") {
            Some(value) => Self::from_label(value),
            None => Self::Identity,
        }
    }

    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        match label.to_ascii_lowercase().as_str() {
            "" | "7bit" | "8bit" | "binary" => Self::Identity,
            "base64" => Self::Base64,
            "quoted-printable" | "quoted_printable" => Self::QuotedPrintable,
            _ => Self::Unknown(label.to_string()),
        }
    }
}

/// Decoded bytes plus any warning raised on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBody {
    pub data: Vec<u8>,
    pub warning: Option<ParseWarning>,
}

impl DecodedBody {
    fn clean(data: Vec<u8>) -> Self {
        Self {
            data,
            warning: None,
        }
    }

    fn passthrough(body: &str, warning: ParseWarning) -> Self {
        warn!(%warning, "Keeping body undecoded");
        Self {
            data: body.as_bytes().to_vec(),
            warning: Some(warning),
        }
    }
}

/// Undo the transfer encoding declared in `headers`.
///
/// Never fails: unknown encodings and undecodable input fall back to the
/// original bytes with a warning.
pub fn decode_body(headers: &HeaderMap, body: &str) -> DecodedBody {
    match TransferEncoding::from_headers(headers) {
        TransferEncoding::Identity => DecodedBody::clean(body.as_bytes().to_vec()),
        TransferEncoding::Base64 => decode_base64(body),
        TransferEncoding::QuotedPrintable => {
            match quoted_printable::decode(body.as_bytes(), quoted_printable::ParseMode::Robust) {
                Ok(data) => DecodedBody::clean(data),
                Err(e) => {
                    DecodedBody::passthrough(body, ParseWarning::InvalidQuotedPrintable(e.to_string()))
                }
            }
        }
        TransferEncoding::Unknown(label) => {
            DecodedBody::passthrough(body, ParseWarning::UnknownEncoding(label))
        }
    }
}

/// Decode base64, skipping anything outside the alphabet.
///
/// A dangling final character that cannot form a byte is dropped and
/// reported.
fn decode_base64(body: &str) -> DecodedBody {
    let mut cleaned: Vec<u8> = body
        .bytes()
        .filter(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/')
        .collect();

    let mut warning = None;
    if cleaned.len() % 4 == 1 {
        cleaned.pop();
        warning = Some(ParseWarning::InvalidBase64("truncated input".to_string()));
    }

    match LENIENT_BASE64.decode(&cleaned) {
        Ok(data) => {
            if let Some(ref w) = warning {
                warn!(warning = %w, "Decoded base64 body on a best-effort basis");
            }
            DecodedBody { data, warning }
        }
        Err(e) => DecodedBody::passthrough(body, ParseWarning::InvalidBase64(e.to_string())),
    }
}

/// Turn decoded text bytes into a string using the declared charset.
///
/// Without a charset, or with one `encoding_rs` does not know, the bytes are
/// read as UTF-8 with replacement characters.
pub fn decode_text(headers: &HeaderMap, data: &[u8]) -> String {
    match classify::charset(headers) {
        Some(charset) => decode_charset(&charset, data),
        None => String::from_utf8_lossy(data).into_owned(),
    }
}

/// Decode bytes using a named charset.
pub fn decode_charset(charset: &str, bytes: &[u8]) -> String {
    let charset_lower = charset.to_lowercase();
    match charset_lower.as_str() {
        "utf-8" | "utf8" | "us-ascii" => String::from_utf8_lossy(bytes).into_owned(),
        _ => {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(bytes);
                decoded.into_owned()
            } else {
                warn!(
                    charset = charset,
                    "Unknown charset, falling back to UTF-8 lossy"
                );
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    fn headers_with(encoding: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Transfer-Encoding", encoding);
        headers
    }

    #[test]
    fn test_identity_encodings() {
        assert_eq!(decode_body(&HeaderMap::new(), "plain").data, b"plain");
        for label in ["7bit", "8BIT", "binary"] {
            let decoded = decode_body(&headers_with(label), "héllo");
            assert_eq!(decoded.data, "héllo".as_bytes());
            assert_eq!(decoded.warning, None);
        }
    }

    #[test]
    fn test_base64_roundtrip_with_line_breaks() {
        let original: Vec<u8> = (0u8..=255).cycle().take(300).collect();
        let encoded = STANDARD.encode(&original);
        let wrapped = encoded
            .as_bytes()
            .chunks(76)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\r\n");

        let decoded = decode_body(&headers_with("Base64"), &wrapped);
        assert_eq!(decoded.warning, None);
        assert_eq!(decoded.data, original);
        assert_eq!(STANDARD.encode(&decoded.data), encoded);
    }

    #[test]
    fn test_base64_missing_padding() {
        let decoded = decode_body(&headers_with("base64"), "aGk");
        assert_eq!(decoded.data, b"hi");
        assert_eq!(decoded.warning, None);
    }

    #[test]
    fn test_base64_truncated() {
        // "aGVsbG8=" is "hello"; drop everything after the first 5 symbols.
        let decoded = decode_body(&headers_with("base64"), "aGVsb");
        assert_eq!(decoded.data, b"hel");
        assert!(matches!(decoded.warning, Some(ParseWarning::InvalidBase64(_))));
    }

    #[test]
    fn test_quoted_printable_both_spellings() {
        for label in ["quoted-printable", "Quoted_Printable"] {
            let decoded = decode_body(&headers_with(label), "caf=C3=A9 =\nlatte");
            assert_eq!(String::from_utf8(decoded.data).unwrap(), "café latte");
        }
    }

    #[test]
    fn test_unknown_encoding_passes_through_with_warning() {
        let body = "begin 644 file.txt\n#86)C\nend";
        let decoded = decode_body(&headers_with("uuencode"), body);
        assert_eq!(decoded.data, body.as_bytes());
        assert_eq!(
            decoded.warning,
            Some(ParseWarning::UnknownEncoding("uuencode".to_string()))
        );
    }

    #[test]
    fn test_decode_text_uses_charset() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "text/plain; charset=iso-8859-1");
        assert_eq!(decode_text(&headers, b"caf\xe9"), "café");
        assert_eq!(decode_text(&HeaderMap::new(), "café".as_bytes()), "café");
    }

    #[test]
    fn test_unknown_charset_is_lossy_utf8() {
        assert_eq!(decode_charset("x-made-up", b"abc"), "abc");
    }
}
