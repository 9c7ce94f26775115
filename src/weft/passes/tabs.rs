//! Tab restructuring
//!
//! Every `tabs` element (from `%%TAB_START`/`%%TAB_HSTART`) is rewritten
//! into a navigation list plus a content-panel list. Each `tab` child pairs
//! with a generated stable id; the first tab is marked active. The
//! horizontal variant differs only in its layout class.

use crate::weft::ast::{ElementNode, Node, Span, TextNode};
use crate::weft::error::{ParseError, ParseResult};

pub fn restructure(nodes: &mut [Node]) -> ParseResult<()> {
    let mut counter = 0;
    walk(nodes, &mut counter)
}

fn walk(nodes: &mut [Node], counter: &mut usize) -> ParseResult<()> {
    for node in nodes.iter_mut() {
        if let Some(children) = node.children_mut() {
            walk(children, counter)?;
        }
    }
    for slot in nodes.iter_mut() {
        if matches!(slot, Node::Element(el) if el.tag() == "tabs") {
            let placeholder = Node::Text(TextNode::new("", Span::new(0, 0)));
            let Node::Element(group) = std::mem::replace(slot, placeholder) else {
                unreachable!("matched an element above");
            };
            *slot = rebuild(group, counter)?;
        }
    }
    Ok(())
}

/// Rewrite one tab group. Anything directly inside the group that is not a
/// `tab` element is a structural error.
fn rebuild(group: ElementNode, counter: &mut usize) -> ParseResult<Node> {
    let horizontal = group.attr("layout") == Some("horizontal");
    let span = group.span;

    let mut members = Vec::new();
    for child in group.children {
        match child {
            Node::Element(el) if el.tag() == "tab" => members.push(el),
            other => {
                return Err(ParseError::NonTabContent {
                    offset: other.span().start,
                })
            }
        }
    }

    let mut wrapper = ElementNode::new("div", span);
    wrapper.set_attr("class", if horizontal { "htabs" } else { "tabs" });
    let mut links = ElementNode::new("ul", span);
    links.set_attr("class", "tab-links");
    let mut pages = ElementNode::new("div", span);
    pages.set_attr("class", "tab-pages");

    for (i, tab) in members.into_iter().enumerate() {
        *counter += 1;
        let id = format!("tab-{counter}");
        let name = tab.attr("name").unwrap_or("").to_string();

        let mut item = ElementNode::new("li", tab.span);
        if i == 0 {
            item.set_attr("class", "active");
        }
        let mut link = ElementNode::new("a", tab.span);
        link.set_attr("href", &format!("#{id}"));
        link.push_child(Node::Text(TextNode::new(name, tab.span)));
        item.push_child(Node::Element(link));
        links.push_child(Node::Element(item));

        let mut page = ElementNode::new("div", tab.span);
        page.set_attr("class", if i == 0 { "tab-page active" } else { "tab-page" });
        page.set_attr("id", &id);
        page.children = tab.children;
        pages.push_child(Node::Element(page));
    }

    wrapper.push_child(Node::Element(links));
    wrapper.push_child(Node::Element(pages));
    Ok(Node::Element(wrapper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weft::parser::Parser;

    fn parse(source: &str) -> Vec<Node> {
        Parser::parse(source).unwrap()
    }

    #[test]
    fn group_becomes_links_and_pages() {
        let mut nodes = parse("%%TAB_START\n%%TAB one%\nalpha\n%%TAB two%\nbeta\n%%TAB_END\n");
        restructure(&mut nodes).unwrap();

        let Node::Element(wrapper) = &nodes[0] else {
            panic!("expected wrapper element");
        };
        assert_eq!(wrapper.attr("class"), Some("tabs"));
        let Node::Element(links) = &wrapper.children[0] else {
            panic!("expected link list");
        };
        assert_eq!(links.tag(), "ul");
        assert_eq!(links.children.len(), 2);
        let Node::Element(first) = &links.children[0] else {
            panic!("expected li");
        };
        assert_eq!(first.attr("class"), Some("active"));

        let Node::Element(pages) = &wrapper.children[1] else {
            panic!("expected page list");
        };
        let Node::Element(page) = &pages.children[0] else {
            panic!("expected page");
        };
        assert_eq!(page.attr("id"), Some("tab-1"));
        assert_eq!(page.attr("class"), Some("tab-page active"));
    }

    #[test]
    fn horizontal_variant_selects_htabs_class() {
        let mut nodes = parse("%%TAB_HSTART\n%%TAB only%\nx\n%%TAB_END\n");
        restructure(&mut nodes).unwrap();
        let Node::Element(wrapper) = &nodes[0] else {
            panic!("expected wrapper");
        };
        assert_eq!(wrapper.attr("class"), Some("htabs"));
    }

    #[test]
    fn non_tab_content_is_a_structural_error() {
        let mut nodes = parse("%%TAB_START\nstray paragraph\n%%TAB_END\n");
        let err = restructure(&mut nodes).unwrap_err();
        assert!(matches!(err, ParseError::NonTabContent { .. }));
    }

    #[test]
    fn rerun_on_restructured_output_is_a_noop() {
        let mut nodes = parse("%%TAB_START\n%%TAB one%\nalpha\n%%TAB_END\n");
        restructure(&mut nodes).unwrap();
        let snapshot = nodes.clone();
        restructure(&mut nodes).unwrap();
        assert_eq!(nodes, snapshot);
    }

    #[test]
    fn ids_are_document_global() {
        let mut nodes = parse(
            "%%TAB_START\n%%TAB a%\nx\n%%TAB_END\n%%TAB_START\n%%TAB b%\ny\n%%TAB_END\n",
        );
        restructure(&mut nodes).unwrap();
        let Node::Element(second) = &nodes[1] else {
            panic!("expected second wrapper");
        };
        let Node::Element(pages) = &second.children[1] else {
            panic!("expected pages");
        };
        let Node::Element(page) = &pages.children[0] else {
            panic!("expected page");
        };
        assert_eq!(page.attr("id"), Some("tab-2"));
    }
}
