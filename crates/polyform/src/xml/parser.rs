//! Recursive-descent XML well-formedness parser
//!
//! Produces the [`model`](crate::xml::model) tree or a positioned error.
//! Comments and processing instructions are skipped; a leading `<?xml ...?>`
//! declaration is captured verbatim so the formatter can replay it. CDATA
//! sections become literal text nodes. Namespaces, DTDs and custom entities
//! are not handled.

use indexmap::IndexMap;

use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Result, Span};
use crate::xml::model::{Content, Document, Element};

/// XML parser over raw bytes
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Parse a complete XML document
    pub fn parse(&mut self) -> Result<Document> {
        self.cursor.skip_whitespace();
        let declaration = self.parse_declaration()?;
        self.cursor.skip_whitespace();

        let root = self.parse_element()?;
        self.cursor.skip_whitespace();

        if !self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::Syntax, "content after document root"));
        }

        Ok(Document { declaration, root })
    }

    /// Capture a leading `<?xml ...?>` declaration verbatim
    fn parse_declaration(&mut self) -> Result<Option<String>> {
        // "<?xml" must be followed by whitespace or "?>"; anything else is an
        // ordinary processing instruction such as <?xml-stylesheet ...?>.
        if !self.cursor.starts_with(b"<?xml")
            || !matches!(self.cursor.peek(5), Some(b' ' | b'\t' | b'\r' | b'\n' | b'?'))
        {
            return Ok(None);
        }

        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(b"?>") {
                self.cursor.advance_by(2);
                let raw = self.cursor.slice_from(start);
                return Ok(Some(bytes_to_string(raw)?));
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated xml declaration"))
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect_byte(b'<')?;

        if self.cursor.current() == Some(b'?') {
            self.skip_processing_instruction()?;
            self.cursor.skip_whitespace();
            return self.parse_element();
        }

        if self.cursor.current() == Some(b'!') {
            self.skip_comment_or_doctype()?;
            self.cursor.skip_whitespace();
            return self.parse_element();
        }

        if self.cursor.current() == Some(b'/') {
            return Err(self.error_here(ErrorKind::Syntax, "unexpected closing tag"));
        }

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.current() == Some(b'/') {
            self.cursor.advance();
            self.expect_byte(b'>')?;
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }

        self.expect_byte(b'>')?;
        let children = self.parse_children(&name)?;

        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn parse_children(&mut self, open_name: &str) -> Result<Vec<Content>> {
        let mut children = Vec::new();

        loop {
            if self.cursor.is_eof() {
                return Err(self.error_here(
                    ErrorKind::UnexpectedEof,
                    format!("unterminated element <{open_name}>"),
                ));
            }

            if self.cursor.starts_with(b"</") {
                self.cursor.advance_by(2);
                let close_name = self.parse_name()?;
                if close_name != open_name {
                    return Err(self.error_here(
                        ErrorKind::MismatchedTag {
                            expected: open_name.to_string(),
                            found: close_name,
                        },
                        "mismatched closing tag",
                    ));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                return Ok(children);
            }

            if self.cursor.starts_with(b"<![CDATA[") {
                children.push(Content::CData(self.parse_cdata()?));
                continue;
            }

            if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
                continue;
            }

            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
                continue;
            }

            if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                children.push(Content::Element(child));
                continue;
            }

            if let Some(text) = self.parse_text()? {
                children.push(Content::Text(text));
            }
        }
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => {
                    return Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated open tag"))
                }
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(self.error_here(
                    ErrorKind::DuplicateAttribute { name },
                    "duplicate attribute",
                ));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b @ (b'"' | b'\'')) => b,
            _ => return Err(self.error_here(ErrorKind::Syntax, "expected quoted attribute value")),
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_string(raw)?;
                return decode_entities(&text);
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated attribute value"))
    }

    /// Raw text up to the next `<`. Whitespace-only runs are dropped here;
    /// the canonical mapping never sees them.
    fn parse_text(&mut self) -> Result<Option<String>> {
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = decode_entities(&bytes_to_string(raw)?)?;

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }

    fn parse_cdata(&mut self) -> Result<String> {
        // cursor at "<![CDATA["
        self.cursor.advance_by(9);
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(b"]]>") {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance_by(3);
                return bytes_to_string(raw);
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated CDATA section"))
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.pos();

        let Some(first) = self.cursor.current() else {
            return Err(self.error_here(ErrorKind::UnexpectedEof, "expected name"));
        };
        if !is_name_start(first) {
            return Err(self.error_here(ErrorKind::Syntax, "invalid name"));
        }

        self.cursor.advance();
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        bytes_to_string(self.cursor.slice_from(start))
    }

    fn skip_comment_or_doctype(&mut self) -> Result<()> {
        // cursor at '!'
        if self.cursor.starts_with(b"!--") {
            self.cursor.advance_by(3);
            return self.skip_until(b"-->");
        }
        self.skip_until(b">")
    }

    fn skip_processing_instruction(&mut self) -> Result<()> {
        // cursor at '?'
        self.cursor.advance();
        self.skip_until(b"?>")
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                self.cursor.advance_by(pattern.len());
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated markup"))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            Err(self.error_here(
                ErrorKind::Syntax,
                format!("expected '{}'", char::from(expected)),
            ))
        }
    }

    fn error_here(&self, kind: ErrorKind, message: impl Into<String>) -> Error {
        let pos = self.cursor.position();
        Error::with_message(kind, Span::new(pos, pos), message)
    }
}

fn bytes_to_string(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| Error::spanless(ErrorKind::InvalidUtf8, "invalid utf-8"))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':')
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

/// Decode the five predefined entities plus numeric character references
fn decode_entities(input: &str) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }
        if !terminated {
            return Err(Error::spanless(
                ErrorKind::InvalidEntity,
                "unterminated entity reference",
            ));
        }

        let decoded = match entity.as_str() {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(&entity),
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                return Err(Error::spanless(
                    ErrorKind::InvalidEntity,
                    format!("invalid entity reference: &{entity};"),
                ));
            }
        }
    }

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Document> {
        Parser::new(input.as_bytes()).parse()
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let doc = parse("<root></root>")?;
        assert_eq!(doc.root.name, "root");
        assert!(doc.root.children.is_empty());
        assert!(doc.declaration.is_none());
        Ok(())
    }

    #[test]
    fn test_parse_with_attributes() -> Result<()> {
        let doc = parse("<root id=\"1\" name='test'></root>")?;
        assert_eq!(doc.root.attributes.get("id"), Some(&"1".to_string()));
        assert_eq!(doc.root.attributes.get("name"), Some(&"test".to_string()));
        Ok(())
    }

    #[test]
    fn test_attribute_order_preserved() -> Result<()> {
        let doc = parse("<root z=\"1\" a=\"2\" m=\"3\"/>")?;
        let names: Vec<_> = doc.root.attributes.keys().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
        Ok(())
    }

    #[test]
    fn test_parse_nested() -> Result<()> {
        let doc = parse("<root><child>text</child></root>")?;
        let Some(Content::Element(child)) = doc.root.children.first() else {
            panic!("expected child element");
        };
        assert_eq!(child.name, "child");
        assert_eq!(child.children, vec![Content::Text("text".to_string())]);
        Ok(())
    }

    #[test]
    fn test_parse_self_closing() -> Result<()> {
        let doc = parse("<root><child /></root>")?;
        let Some(Content::Element(child)) = doc.root.children.first() else {
            panic!("expected child element");
        };
        assert_eq!(child.name, "child");
        assert!(child.children.is_empty());
        Ok(())
    }

    #[test]
    fn test_declaration_captured_verbatim() -> Result<()> {
        let doc = parse("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a/>")?;
        assert_eq!(
            doc.declaration.as_deref(),
            Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>")
        );
        Ok(())
    }

    #[test]
    fn test_cdata_is_literal_text() -> Result<()> {
        let doc = parse("<a><![CDATA[1 < 2 && 3 > 2]]></a>")?;
        assert_eq!(
            doc.root.children,
            vec![Content::CData("1 < 2 && 3 > 2".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_comments_skipped() -> Result<()> {
        let doc = parse("<a><!-- note --><b/><!-- note --></a>")?;
        assert_eq!(doc.root.child_elements().count(), 1);
        Ok(())
    }

    #[test]
    fn test_entities_decoded() -> Result<()> {
        let doc = parse("<a>fish &amp; chips &#65;</a>")?;
        assert_eq!(
            doc.root.children,
            vec![Content::Text("fish & chips A".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_whitespace_only_text_dropped() -> Result<()> {
        let doc = parse("<a>\n  <b/>\n</a>")?;
        assert_eq!(doc.root.children.len(), 1);
        Ok(())
    }

    #[test]
    fn test_mismatched_tag_rejected() {
        let err = parse("<a><b></a></b>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MismatchedTag { .. }));
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let err = parse("<a x=\"1\" x=\"2\"/>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DuplicateAttribute { name } if name == "x"));
    }

    #[test]
    fn test_unterminated_element_rejected() {
        let err = parse("<a><b>").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_trailing_content_rejected() {
        assert!(parse("<a/><b/>").is_err());
    }

    #[test]
    fn test_error_position_reported() {
        let err = parse("<a>\n<b x=1/>\n</a>").unwrap_err();
        assert_eq!(err.span().start.line, 2);
    }
}
