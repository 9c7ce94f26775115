//! Open-tag stack frames
//!
//! The parser keeps an explicit stack of builders for every construct that is
//! currently open. Frames are closed three ways:
//!
//! - **line-scoped** frames (inline toggles, headings, table rows and cells,
//!   definition terms) are force-closed every end of line;
//! - **soft** frames (paragraphs, lists, tables, definition lists,
//!   `>`-quotes, leading-space pre blocks) are closed by a blank line or by a
//!   different block construct starting a line;
//! - **hard** frames (`%%QUOTE`/`%%DIV`/tab directives, conditionals) close
//!   only at their end directive or end of input.
//!
//! Because inline toggles may close a tag that is not the innermost one, the
//! stack is searched top-down by identity and everything above the match is
//! force-closed — a direct truncation, never call-stack recursion.

use crate::weft::ast::{ConditionalNode, ElementNode, Node};

/// What kind of construct a frame represents; drives close behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    /// Inline toggle: b, i, s, small, tt, q, sup, sub.
    Inline,
    Paragraph,
    Heading,
    List { marker: char },
    ListItem,
    Table,
    Row,
    Cell,
    DefList,
    DefTerm,
    DefDef,
    /// `>`-prefixed quote lines.
    Quote,
    /// Leading-space preformatted lines.
    Pre,
    QuoteDirective,
    DivDirective,
    TabGroup,
    Tab,
    Conditional,
}

impl FrameKind {
    pub(crate) fn is_line_scoped(self) -> bool {
        matches!(
            self,
            FrameKind::Inline
                | FrameKind::Heading
                | FrameKind::Row
                | FrameKind::Cell
                | FrameKind::DefTerm
                | FrameKind::DefDef
        )
    }

    pub(crate) fn is_soft(self) -> bool {
        matches!(
            self,
            FrameKind::Paragraph
                | FrameKind::List { .. }
                | FrameKind::ListItem
                | FrameKind::Table
                | FrameKind::DefList
                | FrameKind::Quote
                | FrameKind::Pre
        )
    }
}

/// Which soft family an incoming line keeps alive while the rest close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keep {
    None,
    Lists,
    Table,
    DefList,
    Quote,
    Pre,
    Paragraph,
}

impl Keep {
    pub(crate) fn retains(self, kind: FrameKind) -> bool {
        match self {
            Keep::None => false,
            Keep::Lists => matches!(kind, FrameKind::List { .. } | FrameKind::ListItem),
            Keep::Table => kind == FrameKind::Table,
            Keep::DefList => kind == FrameKind::DefList,
            Keep::Quote => kind == FrameKind::Quote,
            Keep::Pre => kind == FrameKind::Pre,
            Keep::Paragraph => kind == FrameKind::Paragraph,
        }
    }
}

/// One open construct: an element or a conditional under construction.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) kind: FrameKind,
    pub(crate) body: FrameBody,
}

#[derive(Debug)]
pub(crate) enum FrameBody {
    Element(ElementNode),
    Conditional(ConditionalNode),
}

impl Frame {
    pub(crate) fn element(kind: FrameKind, element: ElementNode) -> Self {
        Self {
            kind,
            body: FrameBody::Element(element),
        }
    }

    pub(crate) fn conditional(conditional: ConditionalNode) -> Self {
        Self {
            kind: FrameKind::Conditional,
            body: FrameBody::Conditional(conditional),
        }
    }

    pub(crate) fn tag(&self) -> Option<&str> {
        match &self.body {
            FrameBody::Element(el) => Some(el.tag()),
            FrameBody::Conditional(_) => None,
        }
    }

    pub(crate) fn push_child(&mut self, node: Node) {
        match &mut self.body {
            FrameBody::Element(el) => el.push_child(node),
            FrameBody::Conditional(cond) => cond.children.push(node),
        }
    }

    /// Close the frame at character offset `end`, yielding its node.
    pub(crate) fn finish(self, end: usize) -> Node {
        match self.body {
            FrameBody::Element(mut el) => {
                el.span.end = end.max(el.span.start);
                Node::Element(el)
            }
            FrameBody::Conditional(mut cond) => {
                cond.span.end = end.max(cond.span.start);
                Node::Conditional(cond)
            }
        }
    }
}
