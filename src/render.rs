//! Human-readable rendering of parsed messages for the terminal.

use std::fmt::Write as _;

use humansize::{format_size, DECIMAL};

use crate::config::OutputConfig;
use crate::model::attachment::Attachment;
use crate::model::part::{MessagePart, Multipart, OneOrMany, PartKind};
use crate::parser::mime::ParsedMessage;

/// Controls how much of each part is shown.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Show HTML parts as stripped plain text.
    pub html_as_text: bool,
    /// Truncate content previews to this many characters (0 = no limit).
    pub preview_chars: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&OutputConfig::default())
    }
}

impl From<&OutputConfig> for RenderOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            html_as_text: config.html_as_text,
            preview_chars: config.preview_chars,
        }
    }
}

/// Render the whole tree, headers of the root first, warnings last.
pub fn render_tree(parsed: &ParsedMessage, options: &RenderOptions) -> String {
    let mut out = String::new();
    render_part(&mut out, &parsed.root, options);
    if !parsed.warnings.is_empty() {
        out.push_str("warnings:\n");
        for warning in &parsed.warnings {
            let _ = writeln!(out, "  - {warning}");
        }
    }
    out
}

fn render_part(out: &mut String, part: &MessagePart, options: &RenderOptions) {
    if !part.headers.is_empty() {
        out.push_str("headers:\n");
        for (name, value) in &part.headers {
            let _ = writeln!(out, "  {name}: {value}");
        }
    }

    match &part.kind {
        PartKind::Text { content } => render_content(out, 0, "text", content, options),
        PartKind::Html { content } => render_html(out, 0, "html", content, options),
        PartKind::Attachment(attachment) => render_attachment(out, 0, attachment),
        PartKind::Multipart(multipart) => render_multipart(out, 0, multipart, options),
        PartKind::OpaqueBody { content } => render_content(out, 0, "body", content, options),
        PartKind::Empty => out.push_str("(empty)\n"),
    }
}

fn render_multipart(out: &mut String, indent: usize, multipart: &Multipart, options: &RenderOptions) {
    let pad = "  ".repeat(indent);
    let _ = writeln!(out, "{pad}multipart [{}]", multipart.boundary);
    let inner = indent + 1;

    if let Some(text) = &multipart.promoted_text {
        render_content(out, inner, "text (promoted)", text, options);
    }
    if let Some(html) = &multipart.promoted_html {
        render_html(out, inner, "html (promoted)", html, options);
    }
    for_each_labeled(&multipart.text, "text", |label, text| {
        render_content(out, inner, label, text, options)
    });
    for_each_labeled(&multipart.html, "html", |label, html| {
        render_html(out, inner, label, html, options)
    });
    if let Some(attachments) = &multipart.attachment {
        for attachment in attachments.iter() {
            render_attachment(out, inner, attachment);
        }
    }
    for_each_labeled(&multipart.body, "body", |label, body| {
        render_content(out, inner, label, body, options)
    });
    for nested in &multipart.parts {
        render_multipart(out, inner, nested, options);
    }
}

/// Call `f` for each value of a slot, labelling list entries with their index.
fn for_each_labeled<F>(slot: &Option<OneOrMany<String>>, name: &str, mut f: F)
where
    F: FnMut(&str, &str),
{
    match slot {
        Some(OneOrMany::One(value)) => f(name, value),
        Some(OneOrMany::Many(values)) => {
            for (i, value) in values.iter().enumerate() {
                f(&format!("{name}[{i}]"), value);
            }
        }
        None => {}
    }
}

fn render_html(out: &mut String, indent: usize, label: &str, html: &str, options: &RenderOptions) {
    if options.html_as_text {
        render_content(out, indent, label, &html_to_text(html), options);
    } else {
        render_content(out, indent, label, html, options);
    }
}

fn render_content(out: &mut String, indent: usize, label: &str, content: &str, options: &RenderOptions) {
    let pad = "  ".repeat(indent);
    let _ = writeln!(out, "{pad}{label} ({}):", format_size(content.len(), DECIMAL));
    for line in preview(content, options.preview_chars).lines() {
        let _ = writeln!(out, "{pad}  {line}");
    }
}

fn render_attachment(out: &mut String, indent: usize, attachment: &Attachment) {
    let pad = "  ".repeat(indent);
    let _ = writeln!(
        out,
        "{pad}attachment: {} ({}, {})",
        attachment.filename,
        attachment.mime_type(),
        format_size(attachment.size(), DECIMAL)
    );
}

/// The first `max` characters of `content`, with an ellipsis when cut.
fn preview(content: &str, max: usize) -> String {
    if max == 0 || content.chars().count() <= max {
        return content.to_string();
    }
    let mut cut: String = content.chars().take(max).collect();
    cut.push('…');
    cut
}

/// Convert HTML to plain text for terminal display.
///
/// - Preserves line breaks from `<br>`, `<p>`, `<div>`
/// - Removes scripts and styles
/// - Decodes common HTML entities
pub fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();

    text = remove_tag_block(&text, "script");
    text = remove_tag_block(&text, "style");

    // Convert block elements to newlines
    for tag in &["br", "BR", "br/", "br /"] {
        text = text.replace(&format!("<{tag}>"), "\n");
    }
    for tag in &["p", "div", "tr", "li", "h1", "h2", "h3", "h4", "h5", "h6"] {
        text = text.replace(&format!("<{tag}>"), "\n");
        text = text.replace(&format!("<{tag} "), "\n<");
        let upper = tag.to_uppercase();
        text = text.replace(&format!("<{upper}>"), "\n");
        text = text.replace(&format!("</{tag}>"), "\n");
        text = text.replace(&format!("</{upper}>"), "\n");
    }

    // Strip all remaining HTML tags
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    for (entity, replacement) in [
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&apos;", "'"),
        ("&nbsp;", " "),
        ("&#160;", " "),
        ("&amp;", "&"),
    ] {
        result = result.replace(entity, replacement);
    }

    // Collapse multiple blank lines into one
    let mut prev_was_blank = false;
    let mut cleaned = String::with_capacity(result.len());
    for line in result.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !prev_was_blank {
                cleaned.push('\n');
                prev_was_blank = true;
            }
        } else {
            cleaned.push_str(trimmed);
            cleaned.push('\n');
            prev_was_blank = false;
        }
    }

    cleaned.trim().to_string()
}

/// Remove an entire tag block (e.g. `<script>…</script>`).
fn remove_tag_block(html: &str, tag: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut remaining = html;
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    // ASCII lowercasing keeps byte offsets valid for slicing the original.
    while let Some(start) = remaining.to_ascii_lowercase().find(&open) {
        result.push_str(&remaining[..start]);
        let after = &remaining[start..];
        if let Some(end) = after.to_ascii_lowercase().find(&close) {
            remaining = &after[end + close.len()..];
        } else {
            remaining = "";
            break;
        }
    }
    result.push_str(remaining);
    result
}
