//! Email address validation against a local grammar, with an optional DNS check.
//!
//! Rules are applied in a fixed order and the first one that fails is
//! reported. Nothing here touches the network unless a [`DnsCheck`] is
//! passed in.

#[cfg(feature = "dns")]
pub mod dns;

use crate::error::ValidationError;

/// Longest local part accepted, in bytes.
pub const MAX_LOCAL_LEN: usize = 64;

/// Longest domain accepted, in bytes.
pub const MAX_DOMAIN_LEN: usize = 255;

/// A DNS existence check for the domain of an address.
///
/// Implemented for any `Fn(&str) -> bool`, so callers can inject a stub, a
/// cached lookup, or [`dns::SystemResolver`].
pub trait DnsCheck {
    /// `true` when the domain has an MX or an A record.
    fn has_mx_or_a(&self, domain: &str) -> bool;
}

impl<F> DnsCheck for F
where
    F: Fn(&str) -> bool,
{
    fn has_mx_or_a(&self, domain: &str) -> bool {
        self(domain)
    }
}

/// Validate a single address.
///
/// Accepts either a bare address or the `Display Name <addr>` form, in which
/// case only the bracketed portion is judged. When `dns` is `Some`, the
/// domain must also resolve to an MX or A record.
pub fn validate(address: &str, dns: Option<&dyn DnsCheck>) -> Result<(), ValidationError> {
    let address = bracketed(address);

    if address.is_empty() {
        return Err(ValidationError::Empty);
    }
    if address.contains(' ') {
        return Err(ValidationError::ContainsSpace);
    }

    let at = address.rfind('@').ok_or(ValidationError::MissingAtSign)?;
    let local = &address[..at];
    let domain = &address[at + 1..];

    if local.is_empty() {
        return Err(ValidationError::LocalEmpty);
    }
    if local.len() > MAX_LOCAL_LEN {
        return Err(ValidationError::LocalTooLong);
    }
    if domain.is_empty() {
        return Err(ValidationError::DomainEmpty);
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(ValidationError::DomainTooLong);
    }

    if local.starts_with('.') {
        return Err(ValidationError::LocalStartsWithDot);
    }
    if local.ends_with('.') {
        return Err(ValidationError::LocalEndsWithDot);
    }
    if local.contains("..") {
        return Err(ValidationError::LocalDoubleDot);
    }

    if !domain
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
    {
        return Err(ValidationError::DomainInvalidChars);
    }
    if domain.contains("..") {
        return Err(ValidationError::DomainDoubleDot);
    }

    // Escaped backslashes are always allowed; judge what remains.
    let unescaped = local.replace("\\\\", "");
    if !is_unquoted_local(&unescaped) && !is_quoted_local(&unescaped) {
        return Err(ValidationError::LocalInvalidChars);
    }

    if let Some(dns) = dns {
        if !dns.has_mx_or_a(domain) {
            return Err(ValidationError::NoDnsRecord);
        }
    }

    Ok(())
}

/// Shorthand for a grammar-only check.
pub fn is_valid(address: &str) -> bool {
    validate(address, None).is_ok()
}

/// The part between the first `<` and the following `>`, or the whole input.
fn bracketed(address: &str) -> &str {
    if let Some(start) = address.find('<') {
        let rest = &address[start + 1..];
        if let Some(end) = rest.find('>') {
            return &rest[..end];
        }
    }
    address
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#%&`_=/$'*+?^{}|~.-".contains(c)
}

/// Every unit is an allowed character or a backslash-escaped character.
fn is_unquoted_local(local: &str) -> bool {
    if local.is_empty() {
        return false;
    }
    let mut chars = local.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if chars.next().is_none() {
                return false;
            }
        } else if !is_local_char(c) {
            return false;
        }
    }
    true
}

/// `"…"` with at least one inner character and no bare inner quote.
fn is_quoted_local(local: &str) -> bool {
    let inner = match local
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) if !inner.is_empty() => inner,
        _ => return false,
    };

    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                chars.next();
            }
            '"' => return false,
            _ => {}
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(address: &str) -> Result<(), ValidationError> {
        validate(address, None)
    }

    #[test]
    fn test_plain_address() {
        assert_eq!(check("user@example.com"), Ok(()));
        assert_eq!(check("first.last+tag@sub.example.co.uk"), Ok(()));
    }

    #[test]
    fn test_display_name_form() {
        assert_eq!(check("Name <user@example.com>"), Ok(()));
        assert_eq!(check("\"Last, First\" <user@example.com>"), Ok(()));
        assert_eq!(check("Name <>"), Err(ValidationError::Empty));
    }

    #[test]
    fn test_unclosed_bracket_is_judged_whole() {
        assert_eq!(check("Name <user@example.com"), Err(ValidationError::ContainsSpace));
    }

    #[test]
    fn test_empty_and_space() {
        assert_eq!(check(""), Err(ValidationError::Empty));
        assert_eq!(check("us er@example.com"), Err(ValidationError::ContainsSpace));
    }

    #[test]
    fn test_missing_at_sign() {
        for address in ["user", "user.example.com", "a!b#c"] {
            assert_eq!(check(address), Err(ValidationError::MissingAtSign), "{address}");
        }
    }

    #[test]
    fn test_splits_on_last_at_sign() {
        assert_eq!(check("a@b@example.com"), Err(ValidationError::LocalInvalidChars));
        assert_eq!(check("\"a@b\"@example.com"), Ok(()));
        assert_eq!(check("a\\@b@example.com"), Ok(()));
    }

    #[test]
    fn test_lengths() {
        assert_eq!(check("@example.com"), Err(ValidationError::LocalEmpty));
        assert_eq!(check("user@"), Err(ValidationError::DomainEmpty));

        let local = "a".repeat(65);
        assert_eq!(
            check(&format!("{local}@example.com")),
            Err(ValidationError::LocalTooLong)
        );
        let local = "a".repeat(64);
        assert_eq!(check(&format!("{local}@example.com")), Ok(()));

        let domain = format!("{}.com", "d".repeat(252));
        assert_eq!(
            check(&format!("user@{domain}")),
            Err(ValidationError::DomainTooLong)
        );
    }

    #[test]
    fn test_local_dots() {
        assert_eq!(check(".a@example.com"), Err(ValidationError::LocalStartsWithDot));
        assert_eq!(check("a.@example.com"), Err(ValidationError::LocalEndsWithDot));
        assert_eq!(check("a..b@example.com"), Err(ValidationError::LocalDoubleDot));
    }

    #[test]
    fn test_domain_rules() {
        assert_eq!(check("a@exa_mple.com"), Err(ValidationError::DomainInvalidChars));
        assert_eq!(check("a@exämple.com"), Err(ValidationError::DomainInvalidChars));
        assert_eq!(check("a@exa..mple.com"), Err(ValidationError::DomainDoubleDot));
    }

    #[test]
    fn test_local_characters() {
        assert_eq!(check("a(b)@example.com"), Err(ValidationError::LocalInvalidChars));
        assert_eq!(check("a,b@example.com"), Err(ValidationError::LocalInvalidChars));
        assert_eq!(check("!#$%&'*+/=?^_`{|}~-@example.com"), Ok(()));
        assert_eq!(check("a\\,b@example.com"), Ok(()));
        assert_eq!(check("a\\\\b@example.com"), Ok(()));
    }

    #[test]
    fn test_quoted_local() {
        assert_eq!(check("\"a,b\"@example.com"), Ok(()));
        assert_eq!(check("\"a\\\"b\"@example.com"), Ok(()));
        assert_eq!(check("\"a\"b\"@example.com"), Err(ValidationError::LocalInvalidChars));
        assert_eq!(check("\"\"@example.com"), Err(ValidationError::LocalInvalidChars));
    }

    #[test]
    fn test_first_failing_rule_wins() {
        // Both a leading dot and an invalid domain: the local rule comes first.
        assert_eq!(check(".a@exa_mple.com"), Err(ValidationError::LocalStartsWithDot));
    }

    #[test]
    fn test_dns_check_is_injected() {
        let none = |_: &str| false;
        let some = |domain: &str| domain == "example.com";
        assert_eq!(
            validate("user@example.com", Some(&none)),
            Err(ValidationError::NoDnsRecord)
        );
        assert_eq!(validate("user@example.com", Some(&some)), Ok(()));
        // Grammar failures never reach the resolver.
        let panics = |_: &str| -> bool { panic!("resolver must not be called") };
        assert_eq!(
            validate("user@", Some(&panics)),
            Err(ValidationError::DomainEmpty)
        );
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("user@example.com"));
        assert!(!is_valid("user"));
    }
}
