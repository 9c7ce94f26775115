//! Main module for weft markup functionality

pub mod ast;
pub mod brackets;
pub mod error;
pub mod parser;
pub mod passes;
pub mod render;
pub mod report;
pub mod testing;

use serde::Serialize;

pub use ast::{Node, Span};
pub use error::{ParseError, ParseResult};
pub use render::RenderContext;

/// A parsed document with all passes applied, ready to render any number of
/// times. The tree is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse source text and run the document passes.
    pub fn parse(source: &str) -> ParseResult<Document> {
        let mut nodes = parser::Parser::parse(source)?;
        passes::run_all(&mut nodes)?;
        Ok(Document { nodes })
    }

    /// Build the annotated-source report for a failed parse. The result
    /// renders like any other document.
    pub fn from_error(source: &str, error: &ParseError) -> Document {
        Document {
            nodes: report::error_document(source, error),
        }
    }

    /// The finished top-level nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Render for one viewer.
    pub fn render<C: RenderContext>(&self, ctx: &mut C) -> String {
        render::render(&self.nodes, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weft::testing::RecordingContext;

    #[test]
    fn parse_runs_the_document_passes() {
        let doc = Document::parse("hello\n").unwrap();
        let out = doc.render(&mut RecordingContext::default());
        assert_eq!(out, "<div class=\"text\">hello</div>");
    }

    #[test]
    fn failed_parse_reports_through_a_document() {
        let source = "before [unclosed\n";
        let err = Document::parse(source).unwrap_err();
        assert_eq!(err.offset(), 7);
        let report = Document::from_error(source, &err);
        let out = report.render(&mut RecordingContext::default());
        assert!(out.contains("error-marker"));
    }

    #[test]
    fn rerender_with_different_viewers_does_not_mutate() {
        let doc = Document::parse("[if:staff]\nsecret\n[endif]\n").unwrap();
        let snapshot = doc.clone();
        let shown = doc.render(&mut RecordingContext::allowing(["staff"]));
        let hidden = doc.render(&mut RecordingContext::default());
        assert!(shown.contains("secret"));
        assert!(!hidden.contains("secret"));
        assert_eq!(doc, snapshot);
    }
}
