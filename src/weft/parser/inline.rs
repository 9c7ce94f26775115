//! Inline (within-line) recognition
//!
//! Paired punctuation sequences toggle inline tags with pop-if-open/else-push
//! semantics, scoped to the nearest matching open tag anywhere on the stack.
//! Bracket spans delegate to the bracket resolver; pipes and colons are
//! structural only while a table cell or definition term is open; bare
//! http(s) URLs auto-link unless suppressed with a leading `!`.

use super::stack::{Frame, FrameKind};
use super::Parser;
use crate::weft::ast::{ConditionalNode, ElementNode, Node, Span, TextNode};
use crate::weft::brackets;
use crate::weft::error::{ParseError, ParseResult};

/// Characters the bare-URL auto-linker will absorb.
fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~:/?#@%&=+$,;!'()*".contains(c)
}

impl Parser {
    /// Consume inline content up to and including the end of the current
    /// line, then force-close line-scoped tags.
    pub(super) fn parse_inline_line(&mut self) -> ParseResult<()> {
        loop {
            let Some(ch) = self.cur() else {
                // End of input ends the line implicitly.
                self.flush_text();
                self.clear_line_scoped();
                return Ok(());
            };
            match ch {
                '\n' => {
                    self.flush_text();
                    self.clear_line_scoped();
                    self.pos += 1;
                    return Ok(());
                }
                '%' => self.percent_run(),
                '_' if self.peek(1) == Some('_') => self.toggle_inline("b", 2),
                '\'' if self.peek(1) == Some('\'') => self.toggle_inline("i", 2),
                '-' if self.peek(1) == Some('-') && self.peek(2) == Some('-') => {
                    self.toggle_inline("s", 3)
                }
                '(' if self.peek(1) == Some('(') => self.toggle_inline("small", 2),
                ')' if self.peek(1) == Some(')') => self.toggle_inline("small", 2),
                '{' if self.peek(1) == Some('{') => self.toggle_inline("tt", 2),
                '}' if self.peek(1) == Some('}') => self.toggle_inline("tt", 2),
                '«' if self.peek(1) == Some('«') => self.toggle_inline("q", 2),
                '»' if self.peek(1) == Some('»') => self.toggle_inline("q", 2),
                '⸢' if self.peek(1) == Some('⸢') => self.toggle_inline("sup", 2),
                '⸣' if self.peek(1) == Some('⸣') => self.toggle_inline("sup", 2),
                '⸤' if self.peek(1) == Some('⸤') => self.toggle_inline("sub", 2),
                '⸥' if self.peek(1) == Some('⸥') => self.toggle_inline("sub", 2),
                '[' => self.open_bracket()?,
                ']' => {
                    // `]]` escapes a literal bracket; a stray `]` is one too.
                    self.push_text(']');
                    self.pos += if self.peek(1) == Some(']') { 2 } else { 1 };
                }
                '|' if self.has_frame(FrameKind::Cell) => {
                    if self.table_pipes() {
                        return Ok(()); // trailing pipes ended the row
                    }
                }
                ':' if self.has_frame(FrameKind::DefTerm) => {
                    let start = self.pos;
                    self.flush_text();
                    self.close_nearest(|f| f.kind == FrameKind::DefTerm);
                    self.pos += 1;
                    if self.cur() == Some(' ') {
                        self.pos += 1;
                    }
                    self.open_element(FrameKind::DefDef, "dd", start);
                }
                '!' if self.url_ahead(self.pos + 1) => {
                    // Suppressed auto-link: swallow the `!`, keep the URL
                    // as literal text.
                    self.pos += 1;
                    while let Some(c) = self.cur() {
                        if !is_url_char(c) {
                            break;
                        }
                        self.push_text(c);
                        self.pos += 1;
                    }
                }
                'h' if self.url_ahead(self.pos) => self.auto_link(),
                _ => {
                    self.push_text(ch);
                    self.pos += 1;
                }
            }
        }
    }

    /// Toggle an inline tag: pop the nearest matching open tag (closing
    /// everything stacked above it), or push a new one.
    fn toggle_inline(&mut self, tag: &'static str, token_len: usize) {
        self.flush_text();
        let start = self.pos;
        self.pos += token_len;
        let matching = self
            .stack
            .iter()
            .rposition(|f| f.kind == FrameKind::Inline && f.tag() == Some(tag));
        match matching {
            Some(idx) => self.close_down_to(idx),
            None => self.open_element(FrameKind::Inline, tag, start),
        }
    }

    /// A run of `%`: three or more is one forced line break, the whole run
    /// absorbed; shorter runs are literal.
    fn percent_run(&mut self) {
        let run = self.count_run('%');
        if run >= 3 {
            self.flush_text();
            let span = Span::new(self.pos, self.pos + run);
            self.append(Node::Element(ElementNode::new("br", span)));
            self.pos += run;
        } else {
            for _ in 0..run {
                self.push_text('%');
                self.pos += 1;
            }
        }
    }

    /// Dispatch a `[`: literal escape, conditional open/close, or a bracket
    /// span handed to the bracket resolver.
    fn open_bracket(&mut self) -> ParseResult<()> {
        if self.peek(1) == Some('[') {
            self.push_text('[');
            self.pos += 2;
            return Ok(());
        }
        if self.starts_with("[if:") {
            return self.conditional_open();
        }
        if self.starts_with("[endif]") {
            return self.conditional_end();
        }
        self.bracket_span()
    }

    fn conditional_open(&mut self) -> ParseResult<()> {
        let start = self.pos;
        let mut i = self.pos + 4;
        while i < self.chars.len() && self.chars[i] != ']' {
            i += 1;
        }
        if i >= self.chars.len() {
            return Err(ParseError::UnterminatedBracket { offset: start });
        }
        let condition: String = self.chars[self.pos + 4..i].iter().collect();
        self.open_frame(Frame::conditional(ConditionalNode::new(
            condition.trim(),
            Span::at(start),
        )));
        self.pos = i + 1;
        Ok(())
    }

    fn conditional_end(&mut self) -> ParseResult<()> {
        let start = self.pos;
        let Some(idx) = self
            .stack
            .iter()
            .rposition(|f| f.kind == FrameKind::Conditional)
        else {
            return Err(ParseError::StrayConditionalEnd { offset: start });
        };
        self.flush_text();
        self.pos += "[endif]".len();
        self.close_down_to(idx);
        Ok(())
    }

    /// A complete `[...]` span; the opening offset is the failure location
    /// when the matching `]` never arrives.
    fn bracket_span(&mut self) -> ParseResult<()> {
        let start = self.pos;
        let mut depth = 1usize;
        let mut i = self.pos + 1;
        while i < self.chars.len() {
            match self.chars[i] {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        if depth != 0 {
            return Err(ParseError::UnterminatedBracket { offset: start });
        }
        let content: String = self.chars[start + 1..i].iter().collect();
        self.flush_text();
        let span = Span::new(start, i + 1);
        for node in brackets::resolve(&content, span) {
            self.append(node);
        }
        self.pos = i + 1;
        Ok(())
    }

    /// Pipes inside a table row: close the previous cell and open the next,
    /// unless only whitespace remains to end of line, in which case the run
    /// closes the whole row. Returns `true` when the line is done.
    fn table_pipes(&mut self) -> bool {
        let run = self.count_run('|');
        let mut j = self.pos + run;
        while j < self.chars.len() && matches!(self.chars[j], ' ' | '\t') {
            j += 1;
        }
        let at_eol = j >= self.chars.len() || self.chars[j] == '\n';
        self.flush_text();
        if at_eol {
            self.close_nearest(|f| f.kind == FrameKind::Row);
            self.pos = j;
            if self.cur() == Some('\n') {
                self.pos += 1;
            }
            return true;
        }
        let start = self.pos;
        self.close_nearest(|f| f.kind == FrameKind::Cell);
        self.pos += run;
        let tag = if run >= 2 { "th" } else { "td" };
        self.open_element(FrameKind::Cell, tag, start);
        false
    }

    fn url_ahead(&self, at: usize) -> bool {
        self.starts_with_at("http://", at) || self.starts_with_at("https://", at)
    }

    /// Bare-URL auto-link: absorb the URL charset, then back off trailing
    /// sentence punctuation.
    fn auto_link(&mut self) {
        let start = self.pos;
        let mut end = self.pos;
        while end < self.chars.len() && is_url_char(self.chars[end]) {
            end += 1;
        }
        while end > start && matches!(self.chars[end - 1], '.' | ',' | ';' | ':' | '!' | '?' | '\'' | ')') {
            end -= 1;
        }
        let url: String = self.chars[start..end].iter().collect();
        self.flush_text();
        let span = Span::new(start, end);
        let mut link = ElementNode::new("a", span);
        link.set_attr("href", &url);
        link.push_child(Node::Text(TextNode::new(url, span)));
        self.append(Node::Element(link));
        self.pos = end;
    }
}
