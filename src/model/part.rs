//! The typed message-part tree produced by the parser.

use serde::Serialize;

use super::attachment::Attachment;
use super::headers::HeaderMap;

/// A folded slot that holds a single value until a second one of the same
/// kind arrives, then becomes an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Number of values held.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    /// Never true for a slot built through [`fold_into`], kept for clippy.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first value in arrival order.
    pub fn first(&self) -> Option<&T> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.first(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::One(value) => std::slice::from_ref(value).iter(),
            Self::Many(values) => values.iter(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Store `value` in `slot`: directly on first arrival, as a list afterwards.
pub fn fold_into<T>(slot: &mut Option<OneOrMany<T>>, value: T) {
    *slot = Some(match slot.take() {
        None => OneOrMany::One(value),
        Some(OneOrMany::One(first)) => OneOrMany::Many(vec![first, value]),
        Some(OneOrMany::Many(mut values)) => {
            values.push(value);
            OneOrMany::Many(values)
        }
    });
}

/// One segment of a message: its own headers plus the classified content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagePart {
    pub headers: HeaderMap,
    #[serde(flatten)]
    pub kind: PartKind,
}

/// What a segment turned out to contain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartKind {
    /// `text/plain` content, transfer-decoded.
    Text { content: String },
    /// `text/html` content, transfer-decoded.
    Html { content: String },
    /// A `Content-Disposition: attachment` segment.
    Attachment(Attachment),
    /// A `multipart/*` container with its children folded by type.
    Multipart(Multipart),
    /// A non-empty body with no recognizable type or disposition.
    OpaqueBody { content: String },
    /// Headers only.
    Empty,
}

/// A multipart container after folding.
///
/// Leaf children are folded into one slot per kind, in boundary order.
/// Children that are themselves multipart keep their own folded structure
/// in `parts`; their headers are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Multipart {
    pub boundary: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<OneOrMany<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<OneOrMany<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<OneOrMany<Attachment>>,

    /// Opaque bodies of untyped children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<OneOrMany<String>>,

    /// Nested multipart children.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Multipart>,

    /// Text lifted from the first nested part when there was no direct text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoted_text: Option<String>,

    /// HTML lifted alongside `promoted_text`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoted_html: Option<String>,
}

impl Multipart {
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            ..Self::default()
        }
    }

    /// True when no child contributed anything.
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.html.is_none()
            && self.attachment.is_none()
            && self.body.is_none()
            && self.parts.is_empty()
            && self.promoted_text.is_none()
            && self.promoted_html.is_none()
    }

    /// The lead plain-text content: first direct text, else the promoted one.
    pub fn text(&self) -> Option<&str> {
        self.text
            .as_ref()
            .and_then(OneOrMany::first)
            .or(self.promoted_text.as_ref())
            .map(String::as_str)
    }

    /// The lead HTML content: first direct HTML, else the promoted one.
    pub fn html(&self) -> Option<&str> {
        self.html
            .as_ref()
            .and_then(OneOrMany::first)
            .or(self.promoted_html.as_ref())
            .map(String::as_str)
    }

    /// All attachments in this container and its nested parts, depth first.
    pub fn attachments(&self) -> Vec<&Attachment> {
        let mut result: Vec<&Attachment> = self.attachment.iter().flat_map(|a| a.iter()).collect();
        for part in &self.parts {
            result.extend(part.attachments());
        }
        result
    }
}

impl MessagePart {
    pub fn new(headers: HeaderMap, kind: PartKind) -> Self {
        Self { headers, kind }
    }

    /// Headers-only segment with nothing to show.
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            PartKind::Empty => true,
            PartKind::Multipart(multipart) => multipart.is_empty(),
            _ => false,
        }
    }

    /// The lead plain-text content of this part, if any.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            PartKind::Text { content } => Some(content),
            PartKind::Multipart(multipart) => multipart.text(),
            _ => None,
        }
    }

    /// The lead HTML content of this part, if any.
    pub fn html(&self) -> Option<&str> {
        match &self.kind {
            PartKind::Html { content } => Some(content),
            PartKind::Multipart(multipart) => multipart.html(),
            _ => None,
        }
    }

    pub fn attachments(&self) -> Vec<&Attachment> {
        match &self.kind {
            PartKind::Attachment(attachment) => vec![attachment],
            PartKind::Multipart(multipart) => multipart.attachments(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_into_promotes_to_list() {
        let mut slot = None;
        fold_into(&mut slot, "a");
        assert_eq!(slot, Some(OneOrMany::One("a")));
        fold_into(&mut slot, "b");
        fold_into(&mut slot, "c");
        assert_eq!(slot, Some(OneOrMany::Many(vec!["a", "b", "c"])));
        assert_eq!(slot.as_ref().map(OneOrMany::len), Some(3));
    }

    #[test]
    fn test_multipart_text_prefers_direct() {
        let mut mp = Multipart::new("b");
        mp.promoted_text = Some("promoted".to_string());
        assert_eq!(mp.text(), Some("promoted"));
        fold_into(&mut mp.text, "direct".to_string());
        assert_eq!(mp.text(), Some("direct"));
    }

    #[test]
    fn test_nested_attachments_are_collected() {
        let att = |name: &str| Attachment {
            filename: name.to_string(),
            content_type: None,
            data: Vec::new(),
        };
        let mut inner = Multipart::new("inner");
        fold_into(&mut inner.attachment, att("b.txt"));
        let mut outer = Multipart::new("outer");
        fold_into(&mut outer.attachment, att("a.txt"));
        outer.parts.push(inner);

        let names: Vec<&str> = outer
            .attachments()
            .iter()
            .map(|a| a.filename.as_str())
            .collect();
        assert_eq!(names, ["a.txt", "b.txt"]);
    }

    #[test]
    fn test_json_shape() {
        let part = MessagePart::new(
            HeaderMap::new(),
            PartKind::Text {
                content: "hi".to_string(),
            },
        );
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["content"], "hi");
    }
}
