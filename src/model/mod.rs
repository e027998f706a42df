//! Core data model types: headers, the message-part tree, attachments, and recipient lists.

pub mod address;
pub mod attachment;
pub mod headers;
pub mod part;
