//! XML support: parser, canonical mapping, formatter
//!
//! This is the one format without a JSON-shaped native representation, so it
//! gets a real implementation instead of delegation: a well-formedness parser
//! over [`crate::cursor::Cursor`], the bidirectional mapping between parsed
//! documents and [`crate::Value`] trees, and the presentation-layer formatter
//! and minifier.

pub mod canonical;
pub mod format;
pub mod model;
pub mod parser;

pub use canonical::{value_to_xml, xml_to_value, DEFAULT_ROOT, XML_DECLARATION};
pub use format::{format_xml, is_valid_xml, minify_xml};
pub use model::{Content, Document, Element};
pub use parser::Parser;
