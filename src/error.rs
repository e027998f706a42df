//! Centralized error types for mailtree.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailtree library.
#[derive(Error, Debug)]
pub enum MailError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Message file not found: {0}")]
    FileNotFound(PathBuf),

    /// Multipart nesting went past the configured depth limit.
    #[error("Multipart nesting too deep (limit is {limit})")]
    NestingTooDeep { limit: usize },

    /// An address failed validation.
    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress {
        address: String,
        reason: ValidationError,
    },

    /// The system DNS resolver could not be set up.
    #[error("DNS resolver unavailable: {0}")]
    Resolver(String),
}

/// Why an email address was rejected.
///
/// One variant per validation rule, reported for the first rule that fails.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("email address is empty")]
    Empty,

    #[error("email address is not allowed to contain spaces")]
    ContainsSpace,

    #[error("email address does not contain an at sign (@)")]
    MissingAtSign,

    #[error("the local part of the email address is empty")]
    LocalEmpty,

    #[error("the local part of the email address is too long")]
    LocalTooLong,

    #[error("the domain part of the email address is empty")]
    DomainEmpty,

    #[error("the domain part of the email address is too long")]
    DomainTooLong,

    #[error("the local part of the email address starts with a dot (.)")]
    LocalStartsWithDot,

    #[error("the local part of the email address ends with a dot (.)")]
    LocalEndsWithDot,

    #[error("the local part of the email address has two consecutive dots (..)")]
    LocalDoubleDot,

    #[error("the domain part of the email address contains invalid characters")]
    DomainInvalidChars,

    #[error("the domain part of the email address has two consecutive dots (..)")]
    DomainDoubleDot,

    #[error("the local part of the email address contains invalid characters")]
    LocalInvalidChars,

    #[error("the domain part of the email address has no MX or A record")]
    NoDnsRecord,
}

/// Convenience alias for `Result<T, MailError>`.
pub type Result<T> = std::result::Result<T, MailError>;

impl MailError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
