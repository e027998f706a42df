//! Deciding what a segment contains from its headers.

use crate::model::headers::HeaderMap;
use crate::parser::header::header_param;

/// The outcome of classifying one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentClass {
    Attachment {
        filename: String,
        content_type: Option<String>,
    },
    Text,
    Html,
    Multipart {
        boundary: String,
    },
    /// No recognizable type, but there is a body.
    Opaque,
    /// No recognizable type and no body.
    Empty,
}

/// Classify a segment. Checks run in priority order: attachment disposition,
/// then `text/plain` / `text/html`, then `multipart/*` with a boundary.
pub fn classify(headers: &HeaderMap, body: &str) -> ContentClass {
    if let Some(filename) = attachment_filename(headers) {
        return ContentClass::Attachment {
            filename,
            content_type: bare_content_type(headers),
        };
    }

    if let Some(class) = text_class(headers) {
        return class;
    }

    if let Some(boundary) = multipart_boundary(headers) {
        return ContentClass::Multipart { boundary };
    }

    if body.is_empty() {
        ContentClass::Empty
    } else {
        ContentClass::Opaque
    }
}

/// Filename from `Content-Disposition: attachment; filename="…"`.
///
/// The quoted form is required and an empty filename does not count.
pub fn attachment_filename(headers: &HeaderMap) -> Option<String> {
    const MARKER: &str = "attachment; filename=\"";

    let value = headers.get("content-disposition")?;
    let start = value.to_ascii_lowercase().find(MARKER)? + MARKER.len();
    let rest = &value[start..];
    let filename = &rest[..rest.find('"')?];
    (!filename.is_empty()).then(|| filename.to_string())
}

/// `Text` or `Html` when the content type names `text/plain` or `text/html`.
fn text_class(headers: &HeaderMap) -> Option<ContentClass> {
    let value = headers.get("content-type")?.to_ascii_lowercase();
    let plain = value.find("text/plain");
    let html = value.find("text/html");
    match (plain, html) {
        (Some(p), Some(h)) if h < p => Some(ContentClass::Html),
        (Some(_), _) => Some(ContentClass::Text),
        (None, Some(_)) => Some(ContentClass::Html),
        (None, None) => None,
    }
}

/// Boundary of a `multipart/*` content type.
pub fn multipart_boundary(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("content-type")?;
    let start = value.to_ascii_lowercase().find("multipart/")?;
    header_param(&value[start..], "boundary")
}

/// The content type up to the first `;`, trimmed.
pub fn bare_content_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("content-type")?;
    let bare = value.split(';').next().unwrap_or("").trim();
    (!bare.is_empty()).then(|| bare.to_string())
}

/// The declared `charset` parameter of the content type.
pub fn charset(headers: &HeaderMap) -> Option<String> {
    header_param(headers.get("content-type")?, "charset")
}
