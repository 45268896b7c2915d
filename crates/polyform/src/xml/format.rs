//! Presentation layer: pretty-printer, minifier, validity check

use crate::error::Result;
use crate::xml::model::{Content, Element};
use crate::xml::parser::Parser;

/// True when the input parses as a well-formed XML document.
/// Empty or whitespace-only input is not valid. Never fails.
pub fn is_valid_xml(input: &str) -> bool {
    if input.trim().is_empty() {
        return false;
    }
    Parser::new(input.as_bytes()).parse().is_ok()
}

/// Re-render a document with two-space indentation.
///
/// Validates first and fails on malformed input. A leading `<?xml ...?>`
/// declaration is preserved verbatim as the first output line. Text-only
/// elements render inline on one line; childless elements render
/// self-closing.
pub fn format_xml(input: &str) -> Result<String> {
    let doc = Parser::new(input.as_bytes()).parse()?;

    let mut lines = Vec::new();
    if let Some(declaration) = &doc.declaration {
        lines.push(declaration.clone());
    }
    format_element(&doc.root, 0, &mut lines);
    Ok(lines.join("\n"))
}

fn format_element(element: &Element, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let open = open_tag(element);

    if element.children.is_empty() {
        lines.push(format!("{indent}<{open} />"));
        return;
    }

    if element.children.iter().all(|c| c.as_text().is_some()) {
        let text: String = element.children.iter().map(render_text).collect();
        lines.push(format!("{indent}<{open}>{text}</{}>", element.name));
        return;
    }

    lines.push(format!("{indent}<{open}>"));
    for child in &element.children {
        match child {
            Content::Element(el) => format_element(el, depth + 1, lines),
            text => lines.push(format!("{}{}", "  ".repeat(depth + 1), render_text(text))),
        }
    }
    lines.push(format!("{indent}</{}>", element.name));
}

fn open_tag(element: &Element) -> String {
    let mut tag = element.name.clone();
    for (name, value) in &element.attributes {
        tag.push(' ');
        tag.push_str(name);
        tag.push_str("=\"");
        tag.push_str(&escape_xml(value));
        tag.push('"');
    }
    tag
}

fn render_text(content: &Content) -> String {
    match content {
        Content::Text(text) => escape_xml(text),
        Content::CData(text) => format!("<![CDATA[{text}]]>"),
        Content::Element(_) => String::new(),
    }
}

/// The parser decodes entity references, so re-rendering has to re-escape
/// or the output would no longer be well-formed.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Collapse whitespace strictly between a `>` and the next `<`.
///
/// Purely textual: the input is not validated and is trimmed of leading and
/// trailing whitespace first. Never fails.
pub fn minify_xml(input: &str) -> String {
    let trimmed = input.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut pending_ws = String::new();
    let mut after_close = false;

    for ch in trimmed.chars() {
        if after_close && ch.is_whitespace() {
            pending_ws.push(ch);
            continue;
        }
        if !pending_ws.is_empty() {
            if ch != '<' {
                out.push_str(&pending_ws);
            }
            pending_ws.clear();
        }
        out.push(ch);
        after_close = ch == '>';
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_xml() {
        assert!(is_valid_xml("<a><b/></a>"));
        assert!(is_valid_xml("<?xml version=\"1.0\"?><a/>"));
        assert!(!is_valid_xml(""));
        assert!(!is_valid_xml("   \n  "));
        assert!(!is_valid_xml("<a><b></a>"));
        assert!(!is_valid_xml("plain text"));
    }

    #[test]
    fn test_minify_collapses_between_tags() {
        assert_eq!(minify_xml("<a>\n  <b/>\n</a>"), "<a><b/></a>");
    }

    #[test]
    fn test_minify_trims_and_keeps_text_whitespace() {
        assert_eq!(minify_xml("  <a>x y</a>  "), "<a>x y</a>");
        // Whitespace inside text that does not sit between tags survives.
        assert_eq!(minify_xml("<a>x  <b/></a>"), "<a>x  <b/></a>");
        // Whitespace after '>' followed by text survives too.
        assert_eq!(minify_xml("<a> x</a>"), "<a> x</a>");
    }

    #[test]
    fn test_minify_drops_declaration_gap() {
        assert_eq!(
            minify_xml("<?xml version=\"1.0\"?>\n<a>\n</a>"),
            "<?xml version=\"1.0\"?><a></a>"
        );
    }

    #[test]
    fn test_format_simple() -> Result<()> {
        let out = format_xml("<a><b>1</b><c/></a>")?;
        assert_eq!(out, "<a>\n  <b>1</b>\n  <c />\n</a>");
        Ok(())
    }

    #[test]
    fn test_format_inline_text() -> Result<()> {
        let out = format_xml("<a x=\"1\">hi</a>")?;
        assert_eq!(out, "<a x=\"1\">hi</a>");
        Ok(())
    }

    #[test]
    fn test_format_preserves_declaration() -> Result<()> {
        let out = format_xml("<?xml version=\"1.0\" encoding=\"UTF-8\"?><a><b/></a>")?;
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a>\n  <b />\n</a>"
        );
        Ok(())
    }

    #[test]
    fn test_format_nested_depth() -> Result<()> {
        let out = format_xml("<a><b><c>x</c></b></a>")?;
        assert_eq!(out, "<a>\n  <b>\n    <c>x</c>\n  </b>\n</a>");
        Ok(())
    }

    #[test]
    fn test_format_reescapes_entities() -> Result<()> {
        let out = format_xml("<a>fish &amp; chips</a>")?;
        assert_eq!(out, "<a>fish &amp; chips</a>");
        Ok(())
    }

    #[test]
    fn test_format_rejects_malformed() {
        assert!(format_xml("<a><b></a>").is_err());
        assert!(format_xml("").is_err());
    }
}
