//! The two-mode markup parser
//!
//! A single absorption pointer moves left-to-right over the source. The
//! machine alternates between two modes: **line start**, where block-level
//! constructs are recognized (lists, headings, tables, block directives,
//! ...), and **inline**, where characters are consumed one at a time and
//! toggles, bracket spans, pipes and bare URLs are recognized. End of line
//! always returns to line-start mode, force-closing whatever line-scoped
//! tags were left open.
//!
//! State is one open-tag stack of [`Frame`]s plus an accumulating text
//! buffer, flushed to a [`TextNode`] whenever a structural token interrupts
//! it. The same character sequence means different things depending on the
//! stack: a pipe splits cells only inside a table row, a colon divides a
//! definition only inside its term.
//!
//! No partial results: the whole input parses or the first structural
//! violation aborts with a message and character offset (§ the error
//! reporter turns that into an annotated source listing).

pub(crate) mod stack;

mod inline;
mod line_start;

use crate::weft::ast::{Node, Span, TextNode};
use crate::weft::error::ParseResult;
use stack::{Frame, FrameKind, Keep};

/// The parser state machine. Construct through [`Parser::parse`].
pub struct Parser {
    chars: Vec<char>,
    pos: usize,
    stack: Vec<Frame>,
    out: Vec<Node>,
    text: String,
    text_start: usize,
}

impl Parser {
    /// Parse the complete source text into an ordered list of top-level
    /// nodes. The document passes have not run yet on the result.
    pub fn parse(source: &str) -> ParseResult<Vec<Node>> {
        let mut parser = Parser {
            chars: source.chars().collect(),
            pos: 0,
            stack: Vec::new(),
            out: Vec::new(),
            text: String::new(),
            text_start: 0,
        };
        parser.run()?;
        Ok(parser.out)
    }

    fn run(&mut self) -> ParseResult<()> {
        while self.pos < self.chars.len() {
            self.parse_line()?;
        }
        // Implicitly close everything still open at end of input.
        self.flush_text();
        while let Some(frame) = self.stack.pop() {
            let node = frame.finish(self.pos);
            self.append(node);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    pub(crate) fn cur(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub(crate) fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    pub(crate) fn starts_with(&self, token: &str) -> bool {
        self.starts_with_at(token, self.pos)
    }

    pub(crate) fn starts_with_at(&self, token: &str, at: usize) -> bool {
        let mut i = at;
        for ch in token.chars() {
            if self.chars.get(i) != Some(&ch) {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Index of the next newline at or after the cursor, or end of input.
    pub(crate) fn line_end(&self) -> usize {
        let mut i = self.pos;
        while i < self.chars.len() && self.chars[i] != '\n' {
            i += 1;
        }
        i
    }

    /// Length of the run of `ch` starting at the cursor.
    pub(crate) fn count_run(&self, ch: char) -> usize {
        let mut n = 0;
        while self.peek(n) == Some(ch) {
            n += 1;
        }
        n
    }

    /// Advance past the rest of the current line, including its newline.
    pub(crate) fn consume_line(&mut self) {
        self.pos = self.line_end();
        if self.cur() == Some('\n') {
            self.pos += 1;
        }
    }

    // ------------------------------------------------------------------
    // Text buffer and tree assembly
    // ------------------------------------------------------------------

    /// Buffer one literal character. Call before advancing the cursor so the
    /// pending run's span starts at the character's own offset.
    pub(crate) fn push_text(&mut self, ch: char) {
        if self.text.is_empty() {
            self.text_start = self.pos;
        }
        self.text.push(ch);
    }

    /// Flush the pending text run into a `Text` node.
    pub(crate) fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        let span = Span::new(self.text_start, self.pos);
        self.append(Node::Text(TextNode::new(text, span)));
    }

    /// Attach a finished node to the innermost open frame, or to the
    /// document root when the stack is empty.
    pub(crate) fn append(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(frame) => frame.push_child(node),
            None => self.out.push(node),
        }
    }

    pub(crate) fn open_element(&mut self, kind: FrameKind, tag: &str, start: usize) {
        self.flush_text();
        self.stack.push(Frame::element(
            kind,
            crate::weft::ast::ElementNode::new(tag, Span::at(start)),
        ));
    }

    pub(crate) fn open_frame(&mut self, frame: Frame) {
        self.flush_text();
        self.stack.push(frame);
    }

    // ------------------------------------------------------------------
    // Close machinery
    // ------------------------------------------------------------------

    /// Close `stack[idx]` and everything above it. Open conditionals above
    /// the target are hoisted into the enclosing scope (with the children
    /// they have accumulated) rather than discarded; a conditional is only
    /// ever closed by its own `[endif]`, by end of input, or by being the
    /// target itself.
    pub(crate) fn close_down_to(&mut self, idx: usize) {
        self.flush_text();
        let mut hoisted = Vec::new();
        while self.stack.len() > idx + 1 {
            let frame = self.stack.pop().expect("frames above close target");
            if frame.kind == FrameKind::Conditional {
                hoisted.push(frame);
            } else {
                let node = frame.finish(self.pos);
                self.append(node);
            }
        }
        let target = self.stack.pop().expect("close target on stack");
        let node = target.finish(self.pos);
        self.append(node);
        while let Some(frame) = hoisted.pop() {
            self.stack.push(frame);
        }
    }

    /// Close the nearest frame matching `pred` plus everything above it.
    /// Returns `false` when no frame matches.
    pub(crate) fn close_nearest(&mut self, pred: impl Fn(&Frame) -> bool) -> bool {
        match self.stack.iter().rposition(pred) {
            Some(idx) => {
                self.close_down_to(idx);
                true
            }
            None => false,
        }
    }

    /// Force-close every line-scoped frame; runs at every end of line.
    pub(crate) fn clear_line_scoped(&mut self) {
        self.flush_text();
        if !self.stack.iter().any(|f| f.kind.is_line_scoped()) {
            return;
        }
        let mut hoisted = Vec::new();
        while self.stack.iter().any(|f| f.kind.is_line_scoped()) {
            let frame = self.stack.pop().expect("line-scoped frame below");
            if frame.kind.is_line_scoped() {
                let node = frame.finish(self.pos);
                self.append(node);
            } else {
                hoisted.push(frame);
            }
        }
        while let Some(frame) = hoisted.pop() {
            self.stack.push(frame);
        }
    }

    /// Close soft block containers that do not survive the incoming line
    /// kind: a table line keeps the open table, a list line keeps the list
    /// stack, and so on; everything else soft is closed.
    pub(crate) fn close_soft(&mut self, keep: Keep) {
        self.flush_text();
        let closes = |frame: &Frame| frame.kind.is_soft() && !keep.retains(frame.kind);
        if !self.stack.iter().any(closes) {
            return;
        }
        let mut hoisted = Vec::new();
        while self.stack.iter().any(closes) {
            let frame = self.stack.pop().expect("soft frame below");
            if closes(&frame) {
                let node = frame.finish(self.pos);
                self.append(node);
            } else {
                hoisted.push(frame);
            }
        }
        while let Some(frame) = hoisted.pop() {
            self.stack.push(frame);
        }
    }

    pub(crate) fn has_frame(&self, kind: FrameKind) -> bool {
        self.stack.iter().any(|f| f.kind == kind)
    }
}
