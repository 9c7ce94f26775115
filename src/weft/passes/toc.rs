//! Table-of-contents expansion
//!
//! Every `toc` placeholder (from `%%TOC%%`) is replaced by a generated
//! nested list linking to every assigned heading id. Nesting depth is
//! relative to the shallowest heading weight present, so a document whose
//! only headings are `h3` and `h4` produces a two-level list. Entry labels
//! go through the TOC-clone variant, which omits links and line breaks.

use crate::weft::ast::{ElementNode, Node, Span};

struct Entry {
    weight: usize,
    id: String,
    label: Vec<Node>,
}

pub fn expand(nodes: &mut [Node]) {
    let mut entries = Vec::new();
    collect(nodes, &mut entries);
    replace(nodes, &entries);
}

fn heading_weight(tag: &str) -> Option<usize> {
    match tag {
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        _ => None,
    }
}

fn collect(nodes: &[Node], entries: &mut Vec<Entry>) {
    for node in nodes {
        if let Node::Element(el) = node {
            if let (Some(weight), Some(id)) = (heading_weight(el.tag()), el.attr("id")) {
                entries.push(Entry {
                    weight,
                    id: id.to_string(),
                    label: el.children.iter().filter_map(Node::toc_clone).collect(),
                });
            }
        }
        match node {
            Node::Element(el) => collect(&el.children, entries),
            Node::Conditional(cond) => collect(&cond.children, entries),
            _ => {}
        }
    }
}

fn replace(nodes: &mut [Node], entries: &[Entry]) {
    for slot in nodes.iter_mut() {
        if matches!(slot, Node::Element(el) if el.tag() == "toc") {
            *slot = build(entries, slot.span());
            continue;
        }
        if let Some(children) = slot.children_mut() {
            replace(children, entries);
        }
    }
}

/// Assemble the nested list. A stack of open `ul` builders tracks depth;
/// popping a level nests the finished sublist inside the last item of the
/// level above.
fn build(entries: &[Entry], span: Span) -> Node {
    let mut toc = ElementNode::new("div", span);
    toc.set_attr("class", "toc");
    if entries.is_empty() {
        return Node::Element(toc);
    }

    let min = entries
        .iter()
        .map(|e| e.weight)
        .min()
        .expect("entries is non-empty");
    let mut lists = vec![ElementNode::new("ul", span)];

    for entry in entries {
        let depth = entry.weight - min;
        while lists.len() < depth + 1 {
            lists.push(ElementNode::new("ul", span));
        }
        while lists.len() > depth + 1 {
            pop_level(&mut lists);
        }

        let mut item = ElementNode::new("li", span);
        let mut link = ElementNode::new("a", span);
        link.set_attr("href", &format!("#{}", entry.id));
        link.children = entry.label.clone();
        item.push_child(Node::Element(link));
        lists.last_mut().expect("toc list stack").push_child(Node::Element(item));
    }
    while lists.len() > 1 {
        pop_level(&mut lists);
    }

    toc.push_child(Node::Element(lists.pop().expect("toc list stack")));
    Node::Element(toc)
}

fn pop_level(lists: &mut Vec<ElementNode>) {
    let inner = lists.pop().expect("inner toc level");
    let parent = lists.last_mut().expect("outer toc level");
    match parent.children.last_mut() {
        Some(Node::Element(item)) if item.tag() == "li" => {
            item.push_child(Node::Element(inner));
        }
        _ => parent.push_child(Node::Element(inner)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weft::passes::headings;
    use crate::weft::parser::Parser;

    fn expanded(source: &str) -> Vec<Node> {
        let mut nodes = Parser::parse(source).unwrap();
        headings::assign_ids(&mut nodes);
        expand(&mut nodes);
        nodes
    }

    fn toc_list(nodes: &[Node]) -> &ElementNode {
        let Node::Element(toc) = &nodes[0] else {
            panic!("expected toc wrapper first");
        };
        assert_eq!(toc.attr("class"), Some("toc"));
        let Node::Element(list) = &toc.children[0] else {
            panic!("expected list inside toc");
        };
        list
    }

    #[test]
    fn depth_normalizes_to_shallowest_weight() {
        // Only h3 and h4 present: two levels, not three.
        let nodes = expanded("%%TOC%%\n!!alpha\n!!!beta\n!!gamma\n");
        let list = toc_list(&nodes);
        assert_eq!(list.children.len(), 2); // alpha, gamma
        let Node::Element(first) = &list.children[0] else {
            panic!("expected li");
        };
        // alpha's item carries the nested one-entry sublist for beta.
        assert_eq!(first.children.len(), 2);
        let Node::Element(sub) = &first.children[1] else {
            panic!("expected nested ul");
        };
        assert_eq!(sub.tag(), "ul");
        assert_eq!(sub.children.len(), 1);
    }

    #[test]
    fn entries_link_to_heading_ids() {
        let nodes = expanded("%%TOC%%\n!My Heading\n");
        let list = toc_list(&nodes);
        let Node::Element(item) = &list.children[0] else {
            panic!("expected li");
        };
        let Node::Element(link) = &item.children[0] else {
            panic!("expected link");
        };
        assert_eq!(link.attr("href"), Some("#MyHeading"));
        assert_eq!(Node::Element(link.clone()).flatten_text(), "My Heading");
    }

    #[test]
    fn empty_document_yields_empty_toc() {
        let nodes = expanded("%%TOC%%\nno headings here\n");
        let Node::Element(toc) = &nodes[0] else {
            panic!("expected toc wrapper");
        };
        assert!(toc.children.is_empty());
    }

    #[test]
    fn labels_drop_links_and_breaks() {
        let nodes = expanded("%%TOC%%\n!see [https://example.org docs]\n");
        let list = toc_list(&nodes);
        let Node::Element(item) = &list.children[0] else {
            panic!("expected li");
        };
        let Node::Element(link) = &item.children[0] else {
            panic!("expected link");
        };
        // The heading's own anchor collapsed to its text.
        assert!(link
            .children
            .iter()
            .all(|c| !matches!(c, Node::Element(el) if el.tag() == "a")));
    }
}
