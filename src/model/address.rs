//! Recipient lists: splitting address strings and collecting valid, unique entries.

use serde::Serialize;
use tracing::debug;

use crate::error::{MailError, Result};
use crate::validate;

/// An ordered set of recipient addresses.
///
/// Addresses are trimmed before validation and stored as given (display
/// names included). Invalid entries are skipped by [`add`](Self::add) and
/// duplicates keep their first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecipientList {
    addresses: Vec<String>,
}

impl RecipientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and insert one address.
    ///
    /// Returns `Ok(true)` if it was added, `Ok(false)` if already present.
    pub fn try_add(&mut self, address: &str) -> Result<bool> {
        let address = address.trim();
        validate::validate(address, None).map_err(|reason| MailError::InvalidAddress {
            address: address.to_string(),
            reason,
        })?;
        if self.addresses.iter().any(|a| a == address) {
            return Ok(false);
        }
        self.addresses.push(address.to_string());
        Ok(true)
    }

    /// Insert every valid address, silently dropping the rest.
    pub fn add<I, S>(&mut self, addresses: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for address in addresses {
            if let Err(e) = self.try_add(address.as_ref()) {
                debug!(error = %e, "Dropping recipient");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.addresses.iter().map(String::as_str)
    }

    /// Format for a header: `"a@b.com, Name <c@d.com>"`.
    pub fn display(&self) -> String {
        self.addresses.join(", ")
    }
}

impl std::fmt::Display for RecipientList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl<S: AsRef<str>> FromIterator<S> for RecipientList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        list.add(iter);
        list
    }
}

/// Split a comma-separated address list.
///
/// Commas inside double quotes or angle brackets do not split:
/// `"Last, First" <a@b.com>, other@c.com` yields two entries. Empty segments
/// are dropped and each entry is trimmed.
pub fn split_address_list(raw: &str) -> Vec<String> {
    let mut results = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_angle = false;

    for ch in raw.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '<' if !in_quotes => {
                in_angle = true;
                current.push(ch);
            }
            '>' if !in_quotes => {
                in_angle = false;
                current.push(ch);
            }
            ',' if !in_quotes && !in_angle => {
                push_trimmed(&mut results, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_trimmed(&mut results, &current);

    results
}

fn push_trimmed(results: &mut Vec<String>, segment: &str) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        results.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_add_skips_invalid_and_duplicates() {
        let mut list = RecipientList::new();
        list.add(["a@b.com", "not-an-address", " a@b.com ", "c@d.com"]);
        assert_eq!(list.iter().collect::<Vec<_>>(), ["a@b.com", "c@d.com"]);
    }

    #[test]
    fn test_try_add_reports_reason() {
        let mut list = RecipientList::new();
        match list.try_add("a..b@example.com") {
            Err(MailError::InvalidAddress { reason, .. }) => {
                assert_eq!(reason, ValidationError::LocalDoubleDot)
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(list.try_add("x@example.com").unwrap());
        assert!(!list.try_add("x@example.com").unwrap());
    }

    #[test]
    fn test_display_joins_with_comma() {
        let list: RecipientList = ["User <u@example.com>", "v@example.com"].into_iter().collect();
        assert_eq!(list.to_string(), "User <u@example.com>, v@example.com");
    }

    #[test]
    fn test_split_address_list() {
        let list = split_address_list("User One <a@b.com>, User Two <c@d.com>, plain@addr.com");
        assert_eq!(list, ["User One <a@b.com>", "User Two <c@d.com>", "plain@addr.com"]);
    }

    #[test]
    fn test_split_with_quoted_comma() {
        let list = split_address_list("\"Last, First\" <a@b.com>, other@c.com,,");
        assert_eq!(list, ["\"Last, First\" <a@b.com>", "other@c.com"]);
    }
}
