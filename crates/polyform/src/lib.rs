//! polyform - validate, format, minify and inter-convert JSON/XML/YAML/TOML,
//! plus JWT decode/verify
//!
//! JSON, YAML and TOML are delegated to `serde_json`, `serde_yaml` and `toml`
//! behind a shared order-preserving [`Value`] tree. XML is the exception: it
//! has no JSON-shaped native representation, so this crate implements the
//! parser and the canonical mapping itself (see [`xml`]).
//!
//! # Quick Start
//!
//! ```
//! use polyform::{convert, Format};
//! # fn main() -> Result<(), polyform::Error> {
//! let json = convert("<greeting>hello</greeting>", Format::Xml, Format::Json)?;
//! assert_eq!(json, r#"{"greeting":"hello"}"#);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod cursor;

pub mod value;
pub use value::{Array, Object, Value};

pub mod convert;
pub use convert::{convert, detect_format_from_path, format_text, minify, validate, Format};

pub mod xml;
pub use xml::{
    format_xml, is_valid_xml, minify_xml, value_to_xml, xml_to_value, Document as XmlDocument,
    Element as XmlElement, Parser as XmlParser,
};

pub mod jwt;

/// Parse XML from a string into its document tree
pub fn from_xml_str(s: &str) -> Result<XmlDocument> {
    let mut parser = XmlParser::new(s.as_bytes());
    parser.parse()
}

/// Parse text in any supported format into a canonical value
pub fn from_str(s: &str, format: Format) -> Result<Value> {
    convert::parse(s, format)
}
