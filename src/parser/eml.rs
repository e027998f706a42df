//! Reading messages from `.eml` files and raw bytes.

use std::borrow::Cow;
use std::path::Path;

use crate::error::{MailError, Result};
use crate::parser::mime::{MessageTreeBuilder, ParsedMessage};

/// Parse a single `.eml` file into a message tree.
///
/// An EML file is a bare RFC 5322 message; a leading mbox `From ` line is
/// tolerated and skipped.
pub fn parse_eml(path: impl AsRef<Path>, builder: &MessageTreeBuilder) -> Result<ParsedMessage> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MailError::FileNotFound(path.to_path_buf())
        } else {
            MailError::io(path, e)
        }
    })?;

    parse_bytes(&data, builder)
}

/// Parse raw message bytes into a message tree.
pub fn parse_bytes(data: &[u8], builder: &MessageTreeBuilder) -> Result<ParsedMessage> {
    let text = decode_message_bytes(skip_from_line(strip_bom(data)));
    builder.build(&text)
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

/// Skip the `From ` separator line at the start of MBOX messages.
fn skip_from_line(data: &[u8]) -> &[u8] {
    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

/// Decode raw message bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
fn decode_message_bytes(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            Cow::Owned(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::part::PartKind;

    #[test]
    fn test_skip_from_line() {
        let data = b"From user@example.com Thu Jan 01 00:00:00 2024\nSubject: Test\n\nBody\n";
        let result = skip_from_line(data);
        assert!(result.starts_with(b"Subject:"));
    }

    #[test]
    fn test_skip_from_line_no_from() {
        let data = b"Subject: Test\n\nBody\n";
        let result = skip_from_line(data);
        assert_eq!(result, data);
    }

    #[test]
    fn test_latin1_bytes_fall_back() {
        let data = b"Content-Type: text/plain\n\ncaf\xe9";
        let parsed = parse_bytes(data, &MessageTreeBuilder::default()).unwrap();
        assert_eq!(
            parsed.root.kind,
            PartKind::Text {
                content: "café".to_string()
            }
        );
    }

    #[test]
    fn test_bom_is_stripped() {
        let data = b"\xEF\xBB\xBFSubject: Hi\n\nBody";
        let parsed = parse_bytes(data, &MessageTreeBuilder::default()).unwrap();
        assert_eq!(parsed.root.headers.get("subject"), Some("Hi"));
    }

    #[test]
    fn test_missing_file() {
        let result = parse_eml("/definitely/not/here.eml", &MessageTreeBuilder::default());
        assert!(matches!(result, Err(MailError::FileNotFound(_))));
    }
}
