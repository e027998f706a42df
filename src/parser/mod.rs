//! Message parsing: splitting, header parsing, classification, transfer decoding, and tree building.

pub mod classify;
pub mod decode;
pub mod eml;
pub mod header;
pub mod mime;
pub mod split;
pub mod warning;
