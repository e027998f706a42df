//! `mailtree`: typed MIME part trees and email address validation.
//!
//! A raw message is split into headers and body, classified, transfer-decoded,
//! and, for multipart bodies, recursively decomposed with children folded by
//! kind. Address validation is a separate, pure check with an optional
//! injected DNS lookup.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod validate;

pub use error::{MailError, Result, ValidationError};
pub use model::part::{MessagePart, Multipart, OneOrMany, PartKind};
pub use parser::mime::{parse_message, MessageTreeBuilder, ParsedMessage};
pub use validate::{validate, DnsCheck};
