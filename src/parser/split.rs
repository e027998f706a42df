//! Splitting a raw message into its header block and body.

/// Split raw text into lines on `\n` only.
///
/// A `\r` left at the end of a line stays part of that line.
pub fn lines(raw: &str) -> Vec<&str> {
    raw.split('\n').collect()
}

/// True for a line that separates headers from the body.
///
/// A lone trailing `\r` still counts as blank so CRLF input splits correctly.
pub(crate) fn is_blank_line(line: &str) -> bool {
    line.strip_suffix('\r').unwrap_or(line).is_empty()
}

/// Separate leading header lines from the body.
///
/// Header lines run up to (not including) the first blank line; everything
/// after that line is the body, rejoined with `\n`. Without a blank line the
/// whole input is headers and the body is empty.
pub fn split_message<'a, S: AsRef<str>>(lines: &'a [S]) -> (Vec<&'a str>, String) {
    match lines.iter().position(|line| is_blank_line(line.as_ref())) {
        Some(blank) => {
            let headers: Vec<&str> = lines[..blank].iter().map(|l| l.as_ref()).collect();
            let body = lines[blank + 1..]
                .iter()
                .map(|l| l.as_ref())
                .collect::<Vec<&str>>()
                .join("\n");
            (headers, body)
        }
        None => (lines.iter().map(|l| l.as_ref()).collect(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_first_blank_line() {
        let input = lines("Subject: Hi\nFrom: a@b.com\n\nline one\n\nline two");
        let (headers, body) = split_message(&input);
        assert_eq!(headers, ["Subject: Hi", "From: a@b.com"]);
        assert_eq!(body, "line one\n\nline two");
    }

    #[test]
    fn test_no_blank_line_means_no_body() {
        let input = ["Subject: Hi", "From: a@b.com"];
        let (headers, body) = split_message(&input);
        assert_eq!(headers.len(), 2);
        assert_eq!(body, "");
    }

    #[test]
    fn test_crlf_blank_line() {
        let input = lines("Subject: Hi\r\n\r\nBody\r\n");
        let (headers, body) = split_message(&input);
        assert_eq!(headers, ["Subject: Hi\r"]);
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_leading_blank_line_means_no_headers() {
        let input = ["", "just a body"];
        let (headers, body) = split_message(&input);
        assert!(headers.is_empty());
        assert_eq!(body, "just a body");
    }
}
