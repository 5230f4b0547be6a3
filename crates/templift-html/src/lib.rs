//! HTML tree, parser and serializer for template rewriting.
//!
//! This crate wraps html5ever behind a small owned tree so rewrite passes can
//! rebuild nodes by value, and serializes fragments back to markup.

pub mod node;
pub mod parser;
pub mod serializer;

pub use node::{Attribute, Document, Element, Node};
pub use parser::parse_document_str;
pub use serializer::serialize_inner;
