//! Document passes
//!
//! Four rewrites run exactly once, in fixed order, over the completed raw
//! tree: tab restructuring, heading-id assignment, table-of-contents
//! expansion, and paragraph wrapping. Each pass walks the tree once and
//! replaces nodes in place; the passes are individually idempotent but are
//! only ever run once per document.

pub mod headings;
pub mod paragraphs;
pub mod tabs;
pub mod toc;

use crate::weft::ast::Node;
use crate::weft::error::ParseResult;

/// Run all passes in their fixed order. Tab restructuring is the only pass
/// that can fail (non-tab content directly inside a tab group).
pub fn run_all(nodes: &mut Vec<Node>) -> ParseResult<()> {
    tabs::restructure(nodes)?;
    headings::assign_ids(nodes);
    toc::expand(nodes);
    paragraphs::wrap(nodes);
    Ok(())
}
