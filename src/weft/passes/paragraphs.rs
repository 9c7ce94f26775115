//! Paragraph wrapping
//!
//! Top-level `p` elements (including those directly inside top-level
//! conditionals) become `div class="text"`. Purely cosmetic, kept for
//! compatibility with existing page styling.

use crate::weft::ast::Node;

pub fn wrap(nodes: &mut [Node]) {
    for node in nodes {
        match node {
            Node::Element(el) if el.tag() == "p" => {
                el.retag("div");
                el.set_attr("class", "text");
            }
            Node::Conditional(cond) => wrap(&mut cond.children),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weft::ast::Node;
    use crate::weft::parser::Parser;

    #[test]
    fn top_level_paragraphs_are_retagged() {
        let mut nodes = Parser::parse("one\n\ntwo\n").unwrap();
        wrap(&mut nodes);
        for node in &nodes {
            let Node::Element(el) = node else {
                panic!("expected elements");
            };
            assert_eq!(el.tag(), "div");
            assert_eq!(el.attr("class"), Some("text"));
        }
    }

    #[test]
    fn nested_paragraphs_stay_paragraphs() {
        let mut nodes = Parser::parse("%%DIV box\ninner\n%%DIV_END\n").unwrap();
        wrap(&mut nodes);
        let Node::Element(div) = &nodes[0] else {
            panic!("expected div");
        };
        let Node::Element(inner) = &div.children[0] else {
            panic!("expected inner paragraph");
        };
        assert_eq!(inner.tag(), "p");
    }

    #[test]
    fn paragraphs_inside_top_level_conditionals_are_retagged() {
        let mut nodes = Parser::parse("[if:staff]\nsecret\n[endif]\n").unwrap();
        wrap(&mut nodes);
        let Node::Conditional(cond) = &nodes[0] else {
            panic!("expected conditional");
        };
        let Node::Element(el) = &cond.children[0] else {
            panic!("expected element");
        };
        assert_eq!(el.tag(), "div");
    }
}
