//! AST node model for parsed weft documents
//!
//! A document is a simple forest of four node kinds: [`TextNode`],
//! [`ElementNode`], [`ConditionalNode`] and [`FragmentNode`]. There are no
//! parent or sibling back-references; subtrees can be deep-copied and
//! relocated freely, which the document passes rely on.
//!
//! ## Lifecycle
//!
//! Nodes are created by the parser (or by a document pass), may be replaced
//! in place by a later pass, and are thereafter read-only. Concurrent renders
//! of the same finished tree never mutate it.
//!
//! ## Key invariants
//!
//! - Every node carries a half-open character span `[start, end)` into the
//!   original source, used for error reporting and excerpt extraction.
//! - Tag names are lowercase letters/digits only; `script` and `style` are
//!   permanently rejected because they would defeat output escaping.
//! - Void elements (`br`, `img`, `hr`) never own children.
//!
//! Violating these invariants is a programming error and panics; it is never
//! a user-facing parse failure.

pub mod span;

pub use span::{SourceMap, Span};

use serde::Serialize;

/// Tags that are self-closing and must never have children.
pub const VOID_TAGS: &[&str] = &["br", "img", "hr"];

/// Tags that are rejected outright: emitting them would let authored text
/// escape the renderer's text/attribute escaping.
pub const FORBIDDEN_TAGS: &[&str] = &["script", "style"];

/// Returns `true` when `tag` is a void (self-closing) tag.
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// A node in the parsed document tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Node {
    Text(TextNode),
    Element(ElementNode),
    Conditional(ConditionalNode),
    Fragment(FragmentNode),
}

impl Node {
    /// Source span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Text(n) => n.span,
            Node::Element(n) => n.span,
            Node::Conditional(n) => n.span,
            Node::Fragment(n) => n.span,
        }
    }

    /// Flattened inner text: every literal character in document order,
    /// ignoring markup structure. Fragments contribute nothing because their
    /// expansion is unknown before render time.
    pub fn flatten_text(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out);
        out
    }

    pub(crate) fn flatten_into(&self, out: &mut String) {
        match self {
            Node::Text(n) => out.push_str(&n.text),
            Node::Element(n) => {
                for child in &n.children {
                    child.flatten_into(out);
                }
            }
            Node::Conditional(n) => {
                for child in &n.children {
                    child.flatten_into(out);
                }
            }
            Node::Fragment(_) => {}
        }
    }

    /// Copy of this node suitable for reuse inside a generated table of
    /// contents: links collapse to their flattened text and line breaks are
    /// dropped, so an entry never nests an anchor inside the TOC's own link.
    pub fn toc_clone(&self) -> Option<Node> {
        match self {
            Node::Text(n) => Some(Node::Text(n.clone())),
            Node::Element(n) => match n.tag() {
                "a" => Some(Node::Text(TextNode::new(self.flatten_text(), n.span))),
                "br" => None,
                _ => {
                    let mut copy = ElementNode::new(n.tag(), n.span);
                    for (name, value) in n.attrs() {
                        copy.set_attr(name, value);
                    }
                    copy.children = n.children.iter().filter_map(Node::toc_clone).collect();
                    Some(Node::Element(copy))
                }
            },
            Node::Conditional(n) => {
                let mut copy = ConditionalNode::new(n.condition.clone(), n.span);
                copy.children = n.children.iter().filter_map(Node::toc_clone).collect();
                Some(Node::Conditional(copy))
            }
            Node::Fragment(n) => Some(Node::Fragment(n.clone())),
        }
    }

    /// Mutable access to this node's children, if it owns any.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element(n) if !n.is_void() => Some(&mut n.children),
            Node::Conditional(n) => Some(&mut n.children),
            _ => None,
        }
    }
}

/// An immutable run of literal characters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    pub text: String,
    pub span: Span,
}

impl TextNode {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// A tagged element with ordered attributes and exclusively-owned children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementNode {
    tag: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
    pub span: Span,
}

impl ElementNode {
    /// Create an element. Panics on an invalid or forbidden tag name; those
    /// are programming errors, never parse input.
    pub fn new(tag: &str, span: Span) -> Self {
        assert!(
            !tag.is_empty() && tag.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
            "invalid tag name: {tag:?}"
        );
        assert!(!FORBIDDEN_TAGS.contains(&tag), "forbidden tag name: {tag:?}");
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
            span,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Rename the element in place (used by the paragraph-wrapping pass).
    pub fn retag(&mut self, tag: &str) {
        let mut renamed = ElementNode::new(tag, self.span);
        renamed.attrs = std::mem::take(&mut self.attrs);
        renamed.children = std::mem::take(&mut self.children);
        *self = renamed;
    }

    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }

    /// Append a child node. Panics for void elements.
    pub fn push_child(&mut self, child: Node) {
        assert!(!self.is_void(), "void element <{}> cannot have children", self.tag);
        self.children.push(child);
    }

    /// Ordered attribute list.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value. Attribute names are
    /// lowercase letters and hyphens only.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        assert!(
            !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '-'),
            "invalid attribute name: {name:?}"
        );
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }
}

/// A viewer-conditional block. The condition string is opaque to the engine
/// and evaluated only at render time through the render context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalNode {
    pub condition: String,
    pub children: Vec<Node>,
    pub span: Span,
}

impl ConditionalNode {
    pub fn new(condition: impl Into<String>, span: Span) -> Self {
        Self {
            condition: condition.into(),
            children: Vec::new(),
            span,
        }
    }
}

/// A dynamic fragment invocation, `name|param=value|...`, resolved only at
/// render time. Leaf node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentNode {
    pub text: String,
    pub span: Span,
}

impl FragmentNode {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn flatten_crosses_markup_structure() {
        let mut bold = ElementNode::new("b", span());
        bold.push_child(Node::Text(TextNode::new("bold", span())));
        let mut para = ElementNode::new("p", span());
        para.push_child(Node::Text(TextNode::new("a ", span())));
        para.push_child(Node::Element(bold));
        para.push_child(Node::Fragment(FragmentNode::new("recent|count=5", span())));
        assert_eq!(Node::Element(para).flatten_text(), "a bold");
    }

    #[test]
    fn toc_clone_strips_links_and_breaks() {
        let mut link = ElementNode::new("a", span());
        link.set_attr("href", "/Target");
        link.push_child(Node::Text(TextNode::new("label", span())));
        let mut heading = ElementNode::new("h2", span());
        heading.push_child(Node::Element(link));
        heading.push_child(Node::Element(ElementNode::new("br", span())));
        heading.push_child(Node::Text(TextNode::new(" tail", span())));

        let clone = Node::Element(heading).toc_clone().unwrap();
        let Node::Element(el) = clone else {
            panic!("expected element");
        };
        assert_eq!(el.children.len(), 2);
        assert_eq!(el.children[0], Node::Text(TextNode::new("label", span())));
        assert_eq!(el.children[1], Node::Text(TextNode::new(" tail", span())));
    }

    #[test]
    #[should_panic(expected = "void element")]
    fn void_elements_reject_children() {
        let mut br = ElementNode::new("br", span());
        br.push_child(Node::Text(TextNode::new("x", span())));
    }

    #[test]
    #[should_panic(expected = "forbidden tag")]
    fn script_tag_is_forbidden() {
        let _ = ElementNode::new("script", span());
    }

    #[test]
    fn set_attr_replaces_in_place() {
        let mut el = ElementNode::new("img", span());
        el.set_attr("src", "a.png");
        el.set_attr("alt", "first");
        el.set_attr("src", "b.png");
        let attrs: Vec<_> = el.attrs().collect();
        assert_eq!(attrs, vec![("src", "b.png"), ("alt", "first")]);
    }
}
