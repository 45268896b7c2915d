//! XML document model

use indexmap::IndexMap;

/// A parsed XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Leading `<?xml ...?>` declaration, verbatim, if the input had one
    pub declaration: Option<String>,
    pub root: Element,
}

/// An element: tag name, ordered attributes, ordered children
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Content>,
}

impl Element {
    /// Child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Content::Element(el) => Some(el),
            _ => None,
        })
    }
}

/// A content node inside an element
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
    /// `<![CDATA[...]]>` section; contents are taken literally
    CData(String),
}

impl Content {
    /// Text payload for text-like nodes
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::CData(text) => Some(text),
            Self::Element(_) => None,
        }
    }
}
