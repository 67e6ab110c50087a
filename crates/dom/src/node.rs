//! Node definitions for the live page tree
//!
//! Key design principles:
//! 1. Use u32 indices into a single arena (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for child lists (most nodes have few children)
//! 3. Nodes carry data only; behavior lives on `Document` and `ElementRef`

use smallvec::SmallVec;
use std::collections::HashMap;

/// Node identifier (index into the document arena).
/// u32 allows 4 billion nodes, enough for any webpage.
pub type NodeId = u32;

/// Node kind. Only the kinds an injected extension script actually meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    /// Verbatim markup inserted as-is, e.g. an inline SVG icon string.
    Raw,
}

/// One node of the tree. Stored by value in the arena; never handed out
/// directly. Callers go through `ElementRef`.
#[derive(Debug)]
pub(crate) struct Node {
    pub kind: NodeKind,
    /// Lowercased tag name for elements, "#document", "#text" or "#raw"
    /// for the rest.
    pub name: String,
    /// Text for text nodes, markup for raw nodes, empty otherwise.
    /// Mutable in place, like nodeValue.
    pub value: String,
    pub attributes: HashMap<String, String>,
    pub parent: Option<NodeId>,
    pub children: SmallVec<[NodeId; 4]>,
}

impl Node {
    pub(crate) fn document() -> Self {
        Self::with_kind(NodeKind::Document, "#document".to_string(), String::new())
    }

    pub(crate) fn element(tag: &str) -> Self {
        Self::with_kind(NodeKind::Element, tag.to_ascii_lowercase(), String::new())
    }

    pub(crate) fn text(value: &str) -> Self {
        Self::with_kind(NodeKind::Text, "#text".to_string(), value.to_string())
    }

    pub(crate) fn raw(markup: &str) -> Self {
        Self::with_kind(NodeKind::Raw, "#raw".to_string(), markup.to_string())
    }

    fn with_kind(kind: NodeKind, name: String, value: String) -> Self {
        Self {
            kind,
            name,
            value,
            attributes: HashMap::new(),
            parent: None,
            children: SmallVec::new(),
        }
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|list| list.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub(crate) fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_tag_is_lowercased() {
        let node = Node::element("DIV");
        assert_eq!(node.name, "div");
        assert!(node.is_element());
    }

    #[test]
    fn test_has_class_splits_on_whitespace() {
        let mut node = Node::element("span");
        node.attributes
            .insert("class".to_string(), "cf-toggle  active".to_string());

        assert!(node.has_class("cf-toggle"));
        assert!(node.has_class("active"));
        assert!(!node.has_class("cf"));
    }
}
