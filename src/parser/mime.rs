//! MIME tree building: recursive descent over multipart bodies, folding
//! children by kind and promoting the lead text/html of nested containers.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::error::{MailError, Result};
use crate::model::attachment::Attachment;
use crate::model::headers::HeaderMap;
use crate::model::part::{fold_into, MessagePart, Multipart, OneOrMany, PartKind};
use crate::parser::classify::{classify, ContentClass};
use crate::parser::decode::{decode_body, decode_text, TransferEncoding};
use crate::parser::header::parse_headers;
use crate::parser::split::{lines, split_message};
use crate::parser::warning::ParseWarning;

/// Maximum depth for recursive multipart parsing (to prevent stack overflow on adversarial input).
pub const MAX_DEPTH: usize = 10;

/// The tree built from one message plus every warning raised along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedMessage {
    pub root: MessagePart,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ParseWarning>,
}

/// Builds [`MessagePart`] trees from raw messages.
#[derive(Debug, Clone)]
pub struct MessageTreeBuilder {
    max_depth: usize,
}

impl Default for MessageTreeBuilder {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

impl MessageTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow at most `max_depth` multipart containers nested inside each other.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::with_max_depth(config.max_depth)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Build the tree for a complete raw message.
    ///
    /// Malformed structure never fails the build; it degrades to opaque or
    /// passthrough content and a warning. The only error is
    /// [`MailError::NestingTooDeep`].
    pub fn build(&self, raw: &str) -> Result<ParsedMessage> {
        self.build_lines(&lines(raw))
    }

    /// Build the tree for a message already split into lines.
    pub fn build_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<ParsedMessage> {
        let mut warnings = Vec::new();
        let root = self.build_part(lines, 0, &mut warnings)?;
        Ok(ParsedMessage { root, warnings })
    }

    fn build_part<S: AsRef<str>>(
        &self,
        lines: &[S],
        depth: usize,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<MessagePart> {
        let (header_lines, body) = split_message(lines);
        let headers = parse_headers(&header_lines);
        let body = body.trim();

        let kind = match classify(&headers, body) {
            ContentClass::Attachment {
                filename,
                content_type,
            } => {
                let decoded = decode_body(&headers, body);
                warnings.extend(decoded.warning);
                PartKind::Attachment(Attachment {
                    filename,
                    content_type,
                    data: decoded.data,
                })
            }
            ContentClass::Text => PartKind::Text {
                content: decode_leaf(&headers, body, warnings),
            },
            ContentClass::Html => PartKind::Html {
                content: decode_leaf(&headers, body, warnings),
            },
            ContentClass::Multipart { boundary } => {
                if depth >= self.max_depth {
                    warn!(depth, limit = self.max_depth, "Multipart nesting too deep");
                    return Err(MailError::NestingTooDeep {
                        limit: self.max_depth,
                    });
                }
                self.build_multipart(boundary, body, depth, warnings)?
            }
            ContentClass::Opaque => PartKind::OpaqueBody {
                content: body.to_string(),
            },
            ContentClass::Empty => PartKind::Empty,
        };

        Ok(MessagePart::new(headers, kind))
    }

    fn build_multipart(
        &self,
        boundary: String,
        body: &str,
        depth: usize,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<PartKind> {
        let body_lines = lines(body);
        let Some(segments) = split_on_boundary(&body_lines, &boundary) else {
            // No delimiter at all: keep the body rather than lose it.
            let warning = ParseWarning::MissingBoundary(boundary);
            warn!(%warning, "Treating multipart body as opaque");
            warnings.push(warning);
            return Ok(if body.is_empty() {
                PartKind::Empty
            } else {
                PartKind::OpaqueBody {
                    content: body.to_string(),
                }
            });
        };

        let mut multipart = Multipart::new(boundary);
        for segment in segments {
            // Blank lines right after a delimiter must not end the header block.
            let segment = segment.join("\n");
            let child = self.build_part(&lines(segment.trim()), depth + 1, warnings)?;
            fold_child(&mut multipart, child);
        }
        promote_from_first_part(&mut multipart);

        Ok(PartKind::Multipart(multipart))
    }
}

/// Build a tree with the default depth limit.
pub fn parse_message(raw: &str) -> Result<ParsedMessage> {
    MessageTreeBuilder::default().build(raw)
}

/// Transfer-decode a text/html leaf.
///
/// Only bytes recovered from base64 or quoted-printable are read in the
/// declared charset; any other body is already text.
fn decode_leaf(headers: &HeaderMap, body: &str, warnings: &mut Vec<ParseWarning>) -> String {
    let decoded = decode_body(headers, body);
    warnings.extend(decoded.warning);
    match TransferEncoding::from_headers(headers) {
        TransferEncoding::Base64 | TransferEncoding::QuotedPrintable => {
            decode_text(headers, &decoded.data)
        }
        _ => String::from_utf8_lossy(&decoded.data).into_owned(),
    }
}

/// Split multipart body lines into the segments between delimiter lines.
///
/// A delimiter line is `--boundary`, optionally followed by whitespace, and
/// the close delimiter is `--boundary--`. Longer boundaries that merely start
/// with `boundary` do not match. The preamble before the first delimiter and
/// anything after the close delimiter are dropped. Returns `None` when no
/// delimiter line exists.
fn split_on_boundary<'a, 'b>(lines: &'b [&'a str], boundary: &str) -> Option<Vec<&'b [&'a str]>> {
    let marker = format!("--{boundary}");
    let mut segments = Vec::new();
    let mut open: Option<usize> = None;

    for (i, line) in lines.iter().enumerate() {
        let Some(rest) = line.strip_prefix(marker.as_str()) else {
            continue;
        };
        let rest = rest.trim_end();
        let closing = rest == "--";
        if !closing && !rest.is_empty() {
            continue;
        }

        if let Some(start) = open.take() {
            segments.push(&lines[start..i]);
        }
        if closing {
            return Some(segments);
        }
        open = Some(i + 1);
    }

    // Missing close delimiter: the last segment runs to the end.
    let start = open?;
    segments.push(&lines[start..]);
    Some(segments)
}

/// Fold one built child into its parent container.
fn fold_child(parent: &mut Multipart, child: MessagePart) {
    match child.kind {
        PartKind::Empty => debug!("Skipping headers-only part"),
        PartKind::Multipart(nested) if nested.is_empty() => {
            debug!(boundary = %nested.boundary, "Skipping empty nested multipart")
        }
        PartKind::Multipart(nested) => parent.parts.push(nested),
        PartKind::Text { content } => fold_into(&mut parent.text, content),
        PartKind::Html { content } => fold_into(&mut parent.html, content),
        PartKind::Attachment(attachment) => fold_into(&mut parent.attachment, attachment),
        PartKind::OpaqueBody { content } => fold_into(&mut parent.body, content),
    }
}

/// Lift the first nested part's lead text (and html) when the parent has no
/// text of its own. A nested part left empty is removed.
fn promote_from_first_part(parent: &mut Multipart) {
    if parent.text.is_some() {
        return;
    }
    let Some(first) = parent.parts.first_mut() else {
        return;
    };

    parent.promoted_text = take_lead(&mut first.text, &mut first.promoted_text);
    if parent.html.is_none() {
        parent.promoted_html = take_lead(&mut first.html, &mut first.promoted_html);
    }

    if first.is_empty() {
        parent.parts.remove(0);
    }
}

/// Remove and return the first direct value of a slot, falling back to an
/// already-promoted value.
fn take_lead(slot: &mut Option<OneOrMany<String>>, promoted: &mut Option<String>) -> Option<String> {
    match slot.take() {
        Some(values) => {
            let mut values = values.into_vec().into_iter();
            let lead = values.next();
            for rest in values {
                fold_into(slot, rest);
            }
            lead
        }
        None => promoted.take(),
    }
}
