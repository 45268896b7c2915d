//! Bidirectional mapping between XML documents and canonical values
//!
//! XML has no native object representation, so the mapping applies fixed
//! encoding rules:
//!
//! - every attribute becomes an `@name` key holding its string value;
//! - text content becomes a `#text` key, except that an element with no
//!   attributes and a single text child collapses to a bare string;
//! - a repeated child tag is promoted to an array on its second occurrence,
//!   as are multiple text runs interleaved with elements;
//! - whitespace-only text never contributes.
//!
//! No type coercion is applied: XML text stays a string. The inverse direction
//! re-expands arrays into repeated sibling elements and also accepts
//! hand-authored JSON values that never came from an XML document.

use crate::error::Result;
use crate::value::{Object, Value};
use crate::xml::model::{Content, Document, Element};
use crate::xml::parser::Parser;

/// Root tag used when a value does not name its own root
pub const DEFAULT_ROOT: &str = "root";

/// Fixed declaration emitted by [`value_to_xml`]
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Parse XML text and map it to `{ rootTag: canonical value }`.
///
/// Fails on any well-formedness error; no partial tree is ever produced.
pub fn xml_to_value(input: &str) -> Result<Value> {
    let doc = Parser::new(input.as_bytes()).parse()?;
    Ok(document_to_value(&doc))
}

/// Map an already-parsed document to `{ rootTag: canonical value }`
pub fn document_to_value(doc: &Document) -> Value {
    let mut root = Object::with_capacity(1);
    root.insert(&doc.root.name, element_to_value(&doc.root));
    Value::Object(root)
}

/// Map one element to its canonical value.
///
/// An element with no attributes and exactly one text child collapses to a
/// bare string; attribute presence forces the object form. An element with
/// no attributes and no (significant) children maps to `{}`.
pub fn element_to_value(element: &Element) -> Value {
    // Whitespace-only text is discarded before any collapse or promotion
    // decision. The parser already drops whitespace-only text nodes, but
    // CDATA sections can still be blank.
    let children: Vec<&Content> = element
        .children
        .iter()
        .filter(|c| c.as_text().is_none_or(|t| !t.trim().is_empty()))
        .collect();

    if element.attributes.is_empty() && children.len() == 1 {
        if let Some(text) = children.first().and_then(|c| c.as_text()) {
            return Value::String(text.trim().to_string());
        }
    }

    let mut obj = Object::new();
    for (name, value) in &element.attributes {
        obj.insert(format!("@{name}"), value.clone());
    }

    for child in children {
        match child {
            Content::Element(el) => append_widen(&mut obj, &el.name, element_to_value(el)),
            Content::Text(text) | Content::CData(text) => {
                append_widen(&mut obj, "#text", Value::String(text.trim().to_string()));
            }
        }
    }

    Value::Object(obj)
}

/// Array promotion: absent -> single -> many. The key keeps the position of
/// its first occurrence, which is what preserves document order.
fn append_widen(obj: &mut Object, key: &str, value: Value) {
    if !obj.contains_key(key) {
        obj.insert(key, value);
        return;
    }
    match obj.get_mut(key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::take(existing);
            *existing = Value::Array(vec![first, value].into());
        }
        None => {}
    }
}

/// Serialize a canonical (or arbitrary JSON-compatible) value as XML text.
///
/// Output starts with the fixed UTF-8 declaration. If the value is an object
/// with exactly one key, that key names the document root; otherwise
/// `default_root` wraps the value. No pretty-printing is applied.
///
/// Text and attribute content is inlined verbatim: markup characters in
/// string values are not escaped. Callers producing XML from untrusted
/// strings must escape beforehand.
pub fn value_to_xml(value: &Value, default_root: &str) -> String {
    let mut out = String::with_capacity(64);
    out.push_str(XML_DECLARATION);
    out.push('\n');

    match value {
        // A single-key object names its own root, unless the key holds an
        // array: re-expanding that at top level would emit several document
        // roots, so it falls through to the wrapped form instead.
        Value::Object(obj) if obj.len() == 1 && obj.values().all(|v| !v.is_array()) => {
            if let Some((key, inner)) = obj.iter().next() {
                write_element(inner, key, &mut out);
            }
        }
        Value::Array(_) => {
            out.push('<');
            out.push_str(default_root);
            out.push('>');
            write_inner(value, &mut out);
            out.push_str("</");
            out.push_str(default_root);
            out.push('>');
        }
        _ => write_element(value, default_root, &mut out),
    }

    out
}

/// Emit `value` as one element (or, for arrays, a run of sibling elements)
/// named `name`.
fn write_element(value: &Value, name: &str, out: &mut String) {
    match value {
        Value::Null => {
            out.push('<');
            out.push_str(name);
            out.push_str(" />");
        }
        Value::Array(items) => {
            // Inverse of array promotion: N items become N siblings.
            for item in items {
                write_element(item, name, out);
            }
        }
        Value::Object(obj) => write_object_element(obj, name, out),
        scalar => {
            out.push('<');
            out.push_str(name);
            out.push('>');
            out.push_str(&scalar_text(scalar));
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn write_object_element(obj: &Object, name: &str, out: &mut String) {
    let mut open = String::new();
    open.push('<');
    open.push_str(name);

    // Single pass in key order: `@` keys go on the opening tag, everything
    // else (including `#text`) becomes content in first-occurrence order.
    let mut content = String::new();
    for (key, value) in obj {
        if let Some(attr) = key.strip_prefix('@') {
            open.push(' ');
            open.push_str(attr);
            open.push_str("=\"");
            open.push_str(&scalar_text(value));
            open.push('"');
        } else if key == "#text" {
            write_text_runs(value, &mut content);
        } else {
            write_element(value, key, &mut content);
        }
    }

    out.push_str(&open);
    if content.is_empty() {
        out.push_str(" />");
    } else {
        out.push('>');
        out.push_str(&content);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

/// `#text` content: a scalar, or an array of runs from mixed content
fn write_text_runs(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            for item in items {
                out.push_str(&scalar_text(item));
            }
        }
        other => out.push_str(&scalar_text(other)),
    }
}

/// Emit a value as element content without a wrapping tag, used when the
/// caller-supplied root wraps a value that does not name its own element.
fn write_inner(value: &Value, out: &mut String) {
    match value {
        Value::Object(obj) => {
            for (key, inner) in obj {
                write_element(inner, key, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                write_inner(item, out);
            }
        }
        Value::Null => {}
        scalar => out.push_str(&scalar_text(scalar)),
    }
}

/// String form of a scalar; non-scalars fall back to compact JSON
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => crate::convert::to_json_string(other),
    }
}
