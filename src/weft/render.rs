//! Rendering
//!
//! A strict left-to-right, depth-first walk over the finished tree.
//! Conditionals ask the render context once and render all children or
//! nothing; fragments dispatch to the context's execution hook. The tree is
//! never mutated, so one parsed document serves any number of renders with
//! different viewers. All per-render state (the table-cell style rules)
//! lives in the walker, never globally.

use regex::Regex;

use crate::weft::ast::{ElementNode, FragmentNode, Node};

/// Fragment names the engine recognizes and hands to the context. Anything
/// else renders a visible inline error marker.
pub const KNOWN_FRAGMENTS: &[&str] = &["pagelink", "include", "listpages", "recent", "search"];

/// Per-viewer hooks the host supplies to a render call.
pub trait RenderContext {
    /// Evaluate a conditional node's opaque condition for the current
    /// viewer. Must be pure with respect to the render.
    fn check_condition(&mut self, condition: &str) -> bool;

    /// Execute a named dynamic fragment, writing its contribution directly
    /// to the output.
    fn run_fragment(&mut self, out: &mut String, name: &str, params: &[(String, String)]);

    /// Convert a link target to its final form. The default leaves it
    /// untouched.
    fn resolve_url(&self, url: &str) -> String {
        url.to_string()
    }
}

/// Render a finished tree to output text.
pub fn render<C: RenderContext>(nodes: &[Node], ctx: &mut C) -> String {
    let mut renderer = Renderer {
        ctx,
        out: String::new(),
        cell_rules: Vec::new(),
    };
    for node in nodes {
        renderer.node(node);
    }
    renderer.out
}

/// Escape literal text: `<` and `&`.
pub fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
}

/// Escape an attribute value: `<`, `&` and `"`.
pub fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

struct Renderer<'a, C: RenderContext> {
    ctx: &'a mut C,
    out: String,
    /// Style-filter rules registered by `cellstyle` fragments earlier in
    /// this same walk, in registration order.
    cell_rules: Vec<(Regex, String)>,
}

impl<C: RenderContext> Renderer<'_, C> {
    fn node(&mut self, node: &Node) {
        match node {
            Node::Text(text) => escape_text(&text.text, &mut self.out),
            Node::Element(el) => self.element(el),
            Node::Conditional(cond) => {
                if self.ctx.check_condition(&cond.condition) {
                    for child in &cond.children {
                        self.node(child);
                    }
                }
            }
            Node::Fragment(frag) => self.fragment(frag),
        }
    }

    fn element(&mut self, el: &ElementNode) {
        self.out.push('<');
        self.out.push_str(el.tag());
        for (name, value) in el.attrs() {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            if matches!(name, "href" | "src") {
                let resolved = self.ctx.resolve_url(value);
                escape_attr(&resolved, &mut self.out);
            } else {
                escape_attr(value, &mut self.out);
            }
            self.out.push('"');
        }
        if el.tag() == "td" {
            if let Some(style) = self.cell_style(el) {
                self.out.push_str(" style=\"");
                escape_attr(&style, &mut self.out);
                self.out.push('"');
            }
        }
        if el.is_void() {
            self.out.push_str(" />");
            return;
        }
        self.out.push('>');
        for child in &el.children {
            self.node(child);
        }
        self.out.push_str("</");
        self.out.push_str(el.tag());
        self.out.push('>');
    }

    /// First registered rule matching the cell's flattened text wins; no
    /// match means no style attribute.
    fn cell_style(&self, el: &ElementNode) -> Option<String> {
        if self.cell_rules.is_empty() {
            return None;
        }
        let mut text = String::new();
        for child in &el.children {
            child.flatten_into(&mut text);
        }
        self.cell_rules
            .iter()
            .find(|(pattern, _)| pattern.is_match(&text))
            .map(|(_, style)| style.clone())
    }

    fn fragment(&mut self, frag: &FragmentNode) {
        let (name, raw) = frag
            .text
            .split_once('|')
            .unwrap_or((frag.text.as_str(), ""));
        if name == "cellstyle" {
            self.register_cell_rule(raw);
            return;
        }
        if KNOWN_FRAGMENTS.contains(&name) {
            let params = parse_params(raw);
            self.ctx.run_fragment(&mut self.out, name, &params);
        } else {
            self.error_marker(name);
        }
    }

    /// `cellstyle` parameters are `pattern|style`. A missing style or an
    /// unparsable pattern degrades to the inline error marker, never a
    /// render failure.
    fn register_cell_rule(&mut self, raw: &str) {
        let Some((pattern, style)) = raw.split_once('|') else {
            self.error_marker("cellstyle");
            return;
        };
        match Regex::new(pattern) {
            Ok(compiled) => self.cell_rules.push((compiled, style.to_string())),
            Err(_) => self.error_marker("cellstyle"),
        }
    }

    fn error_marker(&mut self, name: &str) {
        self.out.push_str("<span class=\"module-error\">unknown module: ");
        escape_text(name, &mut self.out);
        self.out.push_str("</span>");
    }
}

/// Split a raw fragment tail into ordered key/value pairs. A segment without
/// `=` keeps its whole text as the key with an empty value.
fn parse_params(raw: &str) -> Vec<(String, String)> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split('|')
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (segment.to_string(), String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weft::ast::{Span, TextNode};
    use crate::weft::testing::RecordingContext;

    fn span() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let mut el = ElementNode::new("a", span());
        el.set_attr("title", "a \"b\" & c");
        el.push_child(Node::Text(TextNode::new("x < y & z", span())));
        let out = render(&[Node::Element(el)], &mut RecordingContext::default());
        assert_eq!(
            out,
            "<a title=\"a &quot;b&quot; &amp; c\">x &lt; y &amp; z</a>"
        );
    }

    #[test]
    fn void_elements_self_close() {
        let out = render(
            &[Node::Element(ElementNode::new("br", span()))],
            &mut RecordingContext::default(),
        );
        assert_eq!(out, "<br />");
    }

    #[test]
    fn unknown_fragment_renders_error_marker() {
        let frag = FragmentNode::new("nosuch|a=1", span());
        let out = render(&[Node::Fragment(frag)], &mut RecordingContext::default());
        assert_eq!(
            out,
            "<span class=\"module-error\">unknown module: nosuch</span>"
        );
    }

    #[test]
    fn known_fragment_dispatches_with_ordered_params() {
        let frag = FragmentNode::new("listpages|order=name|limit=5", span());
        let mut ctx = RecordingContext::default();
        render(&[Node::Fragment(frag)], &mut ctx);
        assert_eq!(ctx.fragments.len(), 1);
        let (name, params) = &ctx.fragments[0];
        assert_eq!(name, "listpages");
        assert_eq!(
            params,
            &vec![
                ("order".to_string(), "name".to_string()),
                ("limit".to_string(), "5".to_string())
            ]
        );
    }

    #[test]
    fn cellstyle_rules_apply_to_later_cells_only() {
        let mut before = ElementNode::new("td", span());
        before.push_child(Node::Text(TextNode::new("FAIL", span())));
        let rule = FragmentNode::new("cellstyle|FAIL|color: red", span());
        let mut after = ElementNode::new("td", span());
        after.push_child(Node::Text(TextNode::new("FAIL", span())));
        let mut ok_cell = ElementNode::new("td", span());
        ok_cell.push_child(Node::Text(TextNode::new("ok", span())));

        let out = render(
            &[
                Node::Element(before),
                Node::Fragment(rule),
                Node::Element(after),
                Node::Element(ok_cell),
            ],
            &mut RecordingContext::default(),
        );
        assert_eq!(
            out,
            "<td>FAIL</td><td style=\"color: red\">FAIL</td><td>ok</td>"
        );
    }

    #[test]
    fn cell_rules_do_not_leak_across_renders() {
        let rule = FragmentNode::new("cellstyle|x|color: red", span());
        let mut cell = ElementNode::new("td", span());
        cell.push_child(Node::Text(TextNode::new("x", span())));
        let with_rule = vec![Node::Fragment(rule), Node::Element(cell.clone())];
        let without = vec![Node::Element(cell)];

        let mut ctx = RecordingContext::default();
        assert!(render(&with_rule, &mut ctx).contains("style="));
        assert!(!render(&without, &mut ctx).contains("style="));
    }

    #[test]
    fn resolve_url_rewrites_link_targets() {
        struct Based;
        impl RenderContext for Based {
            fn check_condition(&mut self, _: &str) -> bool {
                true
            }
            fn run_fragment(&mut self, _: &mut String, _: &str, _: &[(String, String)]) {}
            fn resolve_url(&self, url: &str) -> String {
                format!("https://example.org{url}")
            }
        }
        let mut el = ElementNode::new("a", span());
        el.set_attr("href", "/Page");
        let out = render(&[Node::Element(el)], &mut Based);
        assert_eq!(out, "<a href=\"https://example.org/Page\"></a>");
    }
}
