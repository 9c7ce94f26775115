//! Error reporting
//!
//! A failed parse still produces a renderable node tree: every source line
//! numbered, with the failing line split at the failure column and the
//! error message inserted there inside an error-marker span. This never
//! fails itself, whatever the offset; past-end offsets annotate the last
//! line's end.

use crate::weft::ast::{ElementNode, Node, SourceMap, Span, TextNode};
use crate::weft::error::ParseError;

/// Build the annotated-source tree for a parse failure.
pub fn error_document(source: &str, error: &ParseError) -> Vec<Node> {
    let map = SourceMap::new(source);
    let (fail_line, fail_col) = map.position(error.offset());
    let message = format!(" {error} ");

    let mut report = ElementNode::new("div", Span::new(0, map.len()));
    report.set_attr("class", "error-report");

    let mut header = ElementNode::new("p", Span::at(error.offset()));
    header.set_attr("class", "error-summary");
    header.push_child(Node::Text(TextNode::new(
        format!(
            "the document could not be parsed (line {}, column {})",
            fail_line + 1,
            fail_col + 1
        ),
        Span::at(error.offset()),
    )));
    report.push_child(Node::Element(header));

    let mut listing = ElementNode::new("pre", Span::new(0, map.len()));
    listing.set_attr("class", "error-source");

    let mut offset = 0;
    for (i, line) in source.split('\n').enumerate() {
        let chars = line.chars().count();
        let line_span = Span::new(offset, offset + chars);
        let number = format!("{:>4}: ", i + 1);

        if i == fail_line {
            // Clamp: the failure column can sit at the line's end.
            let col = fail_col.min(chars);
            let prefix: String = line.chars().take(col).collect();
            let suffix: String = line.chars().skip(col).collect();
            listing.push_child(Node::Text(TextNode::new(
                format!("{number}{prefix}"),
                Span::new(offset, offset + col),
            )));
            let mut marker = ElementNode::new("span", Span::at(error.offset()));
            marker.set_attr("class", "error-marker");
            marker.push_child(Node::Text(TextNode::new(
                message.clone(),
                Span::at(error.offset()),
            )));
            listing.push_child(Node::Element(marker));
            listing.push_child(Node::Text(TextNode::new(
                format!("{suffix}\n"),
                Span::new(offset + col, offset + chars),
            )));
        } else {
            listing.push_child(Node::Text(TextNode::new(
                format!("{number}{line}\n"),
                line_span,
            )));
        }
        offset += chars + 1; // the split-off newline
    }

    report.push_child(Node::Element(listing));
    vec![Node::Element(report)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weft::render;
    use crate::weft::testing::RecordingContext;

    fn rendered(source: &str, error: &ParseError) -> String {
        let nodes = error_document(source, error);
        render::render(&nodes, &mut RecordingContext::default())
    }

    #[test]
    fn failing_line_is_split_at_the_column() {
        let source = "fine\nbad [bracket here\nfine\n";
        let error = ParseError::UnterminatedBracket { offset: 9 };
        let out = rendered(source, &error);
        assert!(out.contains("   1: fine"));
        assert!(out.contains(
            "   2: bad <span class=\"error-marker\"> bracket span is never closed </span>[bracket here"
        ));
        assert!(out.contains("   3: fine"));
    }

    #[test]
    fn offset_past_end_of_input_still_reports() {
        let source = "only line";
        let error = ParseError::UnterminatedVerbatim { offset: 10_000 };
        let out = rendered(source, &error);
        assert!(out.contains("   1: only line<span class=\"error-marker\">"));
    }

    #[test]
    fn report_is_a_tree_not_text() {
        let nodes = error_document("x\n", &ParseError::StrayConditionalEnd { offset: 0 });
        assert_eq!(nodes.len(), 1);
        let Node::Element(report) = &nodes[0] else {
            panic!("expected report element");
        };
        assert_eq!(report.attr("class"), Some("error-report"));
    }

    #[test]
    fn source_markup_is_escaped_not_parsed() {
        let source = "a & b <tag>\n[open\n";
        let error = ParseError::UnterminatedBracket { offset: 12 };
        let out = rendered(source, &error);
        assert!(out.contains("a &amp; b &lt;tag>"));
    }
}
