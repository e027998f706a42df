//! Header block parsing: names, values, and folded continuation lines.

use crate::model::headers::HeaderMap;

/// Parse header lines into a [`HeaderMap`].
///
/// A line of the form `Name:` starts a new header, where the name is a letter
/// followed by at least one letter, digit, `-` or `_`. The value is the
/// trimmed remainder. Any other line continues the previous header: its
/// trimmed content is appended after a single space. Continuations before
/// the first header are dropped, as are blank ones.
///
/// A repeated header name replaces the earlier value.
pub fn parse_headers<S: AsRef<str>>(lines: &[S]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let mut previous: Option<String> = None;

    for line in lines {
        let line = line.as_ref();
        if let Some(name) = header_name(line) {
            let value = line[name.len() + 1..].trim();
            let name = name.to_ascii_lowercase();
            headers.insert(&name, value);
            previous = Some(name);
        } else if let Some(ref name) = previous {
            let continuation = line.trim();
            if !continuation.is_empty() {
                headers.append(name, continuation);
            }
        }
        // Continuation with nothing to attach to is silently skipped
    }

    headers
}

/// The header name at the start of `line`, if the line opens a header.
fn header_name(line: &str) -> Option<&str> {
    let bytes = line.as_bytes();
    if !bytes.first()?.is_ascii_alphabetic() {
        return None;
    }
    let len = bytes[1..]
        .iter()
        .take_while(|&&b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        .count();
    if len == 0 || bytes.get(len + 1) != Some(&b':') {
        return None;
    }
    Some(&line[..len + 1])
}

/// Look up a `name=value` parameter in a structured header value.
///
/// The name match is case-insensitive. Quoted values run to the closing
/// quote; bare values end at `;` or whitespace. Empty values count as absent.
pub fn header_param(value: &str, name: &str) -> Option<String> {
    let lower = value.to_ascii_lowercase();
    let needle = format!("{}=", name.to_ascii_lowercase());

    let mut search_from = 0;
    while let Some(found) = lower[search_from..].find(&needle) {
        let start = search_from + found;
        search_from = start + needle.len();

        // Must be a whole parameter name, not the tail of a longer one.
        let preceded_ok = lower[..start]
            .chars()
            .next_back()
            .map_or(true, |c| c == ';' || c.is_whitespace());
        if !preceded_ok {
            continue;
        }

        let rest = &value[search_from..];
        let param = match rest.strip_prefix('"') {
            Some(quoted) => &quoted[..quoted.find('"')?],
            None => rest
                .split(|c: char| c == ';' || c.is_whitespace())
                .next()
                .unwrap_or(""),
        };
        return (!param.is_empty()).then(|| param.to_string());
    }
    None
}
