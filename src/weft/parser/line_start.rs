//! Line-start (block) recognition
//!
//! At the start of every line the parser decides which block construct the
//! line opens or continues, in priority order: list markers, `%%` block
//! directives, headings, horizontal rules, table rows, definition terms,
//! `>`-quotes, leading-space preformatted lines, and finally the ordinary
//! paragraph fallback. Soft containers of other families are closed before
//! the new construct opens.

use super::stack::{Frame, FrameKind, Keep};
use super::Parser;
use crate::weft::ast::{ElementNode, Node, Span, TextNode};
use crate::weft::error::{ParseError, ParseResult};

impl Parser {
    /// Consume one complete source line, including its newline.
    pub(super) fn parse_line(&mut self) -> ParseResult<()> {
        let end = self.line_end();
        let line: String = self.chars[self.pos..end].iter().collect();
        let trimmed = line.trim_end();

        if trimmed.is_empty() {
            // Blank line: paragraph (and every other soft container) ends.
            self.close_soft(Keep::None);
            self.consume_line();
            return Ok(());
        }

        let first = trimmed.chars().next().expect("non-empty line");
        if first == '*' || first == '#' {
            return self.list_line();
        }
        if trimmed.starts_with("%%") {
            if let Some(handled) = self.directive_line(trimmed)? {
                return Ok(handled);
            }
            // Unknown %% runs fall through to the paragraph handler; an
            // inline %%%-run there is a forced break, the rest is text.
        }
        if first == '!' {
            return self.heading_line();
        }
        if trimmed.len() >= 4 && trimmed.chars().all(|c| c == '-') {
            return self.rule_line(trimmed.len());
        }
        if first == '|' {
            return self.table_line();
        }
        if first == ';' {
            return self.definition_line();
        }
        if first == '>' {
            return self.quote_line();
        }
        if line.starts_with(' ') {
            return self.preformatted_line();
        }
        if first == '[' {
            if let Some(handled) = self.conditional_line(trimmed)? {
                return Ok(handled);
            }
        }
        self.paragraph_line()
    }

    /// Lines that are exactly `[if:...]` or `[endif]` open and close
    /// block-level conditionals without starting a paragraph; a conditional
    /// appearing mid-line is handled by the inline recognizer instead.
    fn conditional_line(&mut self, trimmed: &str) -> ParseResult<Option<()>> {
        if trimmed == "[endif]" {
            let Some(idx) = self
                .stack
                .iter()
                .rposition(|f| f.kind == FrameKind::Conditional)
            else {
                return Err(ParseError::StrayConditionalEnd { offset: self.pos });
            };
            self.close_down_to(idx);
            self.consume_line();
            return Ok(Some(()));
        }
        if let Some(condition) = trimmed
            .strip_prefix("[if:")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            if !condition.contains([']', '[']) {
                let node = crate::weft::ast::ConditionalNode::new(
                    condition.trim(),
                    Span::at(self.pos),
                );
                self.open_frame(Frame::conditional(node));
                self.consume_line();
                return Ok(Some(()));
            }
        }
        Ok(None)
    }

    /// `%%`-prefixed block directives. Returns `Ok(None)` when the line is
    /// not a recognized directive and should fall through to plain text.
    fn directive_line(&mut self, trimmed: &str) -> ParseResult<Option<()>> {
        if trimmed == "%%QUOTE_END" {
            return self.block_end("%%QUOTE_END", FrameKind::QuoteDirective).map(Some);
        }
        if trimmed == "%%QUOTE" || trimmed.starts_with("%%QUOTE ") {
            self.quote_directive(trimmed["%%QUOTE".len()..].trim());
            return Ok(Some(()));
        }
        if trimmed == "%%DIV_END" {
            return self.block_end("%%DIV_END", FrameKind::DivDirective).map(Some);
        }
        if trimmed == "%%DIV" || trimmed.starts_with("%%DIV ") {
            self.div_directive(trimmed["%%DIV".len()..].trim());
            return Ok(Some(()));
        }
        if trimmed == "%%TAB_START" {
            self.tab_group_directive(false);
            return Ok(Some(()));
        }
        if trimmed == "%%TAB_HSTART" {
            self.tab_group_directive(true);
            return Ok(Some(()));
        }
        if trimmed == "%%TAB_END" {
            return self.tab_end_directive().map(Some);
        }
        if let Some(rest) = trimmed.strip_prefix("%%TAB ") {
            if let Some(name) = rest.strip_suffix('%') {
                return self.tab_directive(name.trim()).map(Some);
            }
        }
        if trimmed == "%%SRC_EMBED" || trimmed.starts_with("%%SRC_EMBED ") {
            let lang = trimmed["%%SRC_EMBED".len()..].trim().to_string();
            return self.verbatim_block(&lang).map(Some);
        }
        if trimmed == "%%TOC%%" {
            self.toc_placeholder();
            return Ok(Some(()));
        }
        Ok(None)
    }

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    /// Bulleted/numbered list lines. Nesting depth and kind come from
    /// matching the new marker run against the currently-open run: the
    /// differing suffix of open levels closes, the new suffix opens.
    fn list_line(&mut self) -> ParseResult<()> {
        self.close_soft(Keep::Lists);
        let start = self.pos;

        let mut markers = Vec::new();
        while let Some(ch @ ('*' | '#')) = self.cur() {
            markers.push(ch);
            self.pos += 1;
        }
        while self.cur() == Some(' ') {
            self.pos += 1;
        }

        let open: Vec<char> = self
            .stack
            .iter()
            .filter_map(|f| match f.kind {
                FrameKind::List { marker } => Some(marker),
                _ => None,
            })
            .collect();
        let mut common = 0;
        while common < open.len() && common < markers.len() && open[common] == markers[common] {
            common += 1;
        }

        self.close_list_levels(common);
        if markers.len() == common {
            // Sibling item at the current depth.
            self.close_sibling_item();
            self.open_element(FrameKind::ListItem, "li", start);
        } else {
            for &marker in &markers[common..] {
                let tag = if marker == '*' { "ul" } else { "ol" };
                self.open_element(FrameKind::List { marker }, tag, start);
                self.open_element(FrameKind::ListItem, "li", start);
            }
        }
        self.parse_inline_line()
    }

    /// Close list levels (and their open items) until `depth` remain.
    fn close_list_levels(&mut self, depth: usize) {
        loop {
            let open = self
                .stack
                .iter()
                .filter(|f| matches!(f.kind, FrameKind::List { .. }))
                .count();
            if open <= depth {
                return;
            }
            let idx = self
                .stack
                .iter()
                .rposition(|f| matches!(f.kind, FrameKind::List { .. }))
                .expect("open list level");
            self.close_down_to(idx);
        }
    }

    /// Close the current item of the deepest open list, if one is open.
    fn close_sibling_item(&mut self) {
        let Some(list_idx) = self
            .stack
            .iter()
            .rposition(|f| matches!(f.kind, FrameKind::List { .. }))
        else {
            return;
        };
        if let Some(item_idx) = self.stack.iter().rposition(|f| f.kind == FrameKind::ListItem) {
            if item_idx > list_idx {
                self.close_down_to(item_idx);
            }
        }
    }

    // ------------------------------------------------------------------
    // Block directives
    // ------------------------------------------------------------------

    fn quote_directive(&mut self, author: &str) {
        self.close_soft(Keep::None);
        let mut el = ElementNode::new("blockquote", Span::at(self.pos));
        el.set_attr("class", "quote");
        if !author.is_empty() {
            el.set_attr("data-author", author);
        }
        self.open_frame(Frame::element(FrameKind::QuoteDirective, el));
        self.consume_line();
    }

    fn div_directive(&mut self, class: &str) {
        self.close_soft(Keep::None);
        let mut el = ElementNode::new("div", Span::at(self.pos));
        if !class.is_empty() {
            el.set_attr("class", class);
        }
        self.open_frame(Frame::element(FrameKind::DivDirective, el));
        self.consume_line();
    }

    fn tab_group_directive(&mut self, horizontal: bool) {
        self.close_soft(Keep::None);
        let mut el = ElementNode::new("tabs", Span::at(self.pos));
        if horizontal {
            el.set_attr("layout", "horizontal");
        }
        self.open_frame(Frame::element(FrameKind::TabGroup, el));
        self.consume_line();
    }

    fn tab_directive(&mut self, name: &str) -> ParseResult<()> {
        if !self.has_frame(FrameKind::TabGroup) {
            return Err(ParseError::TabOutsideGroup { offset: self.pos });
        }
        self.close_soft(Keep::None);
        // A new tab ends the previous one; the group stays open.
        self.close_nearest(|f| f.kind == FrameKind::Tab);
        let mut el = ElementNode::new("tab", Span::at(self.pos));
        el.set_attr("name", name);
        self.open_frame(Frame::element(FrameKind::Tab, el));
        self.consume_line();
        Ok(())
    }

    fn tab_end_directive(&mut self) -> ParseResult<()> {
        self.close_soft(Keep::None);
        if !self.close_nearest(|f| f.kind == FrameKind::TabGroup) {
            return Err(ParseError::UnmatchedBlockEnd {
                directive: "%%TAB_END".to_string(),
                offset: self.pos,
            });
        }
        self.consume_line();
        Ok(())
    }

    fn block_end(&mut self, directive: &str, kind: FrameKind) -> ParseResult<()> {
        self.close_soft(Keep::None);
        if !self.close_nearest(|f| f.kind == kind) {
            return Err(ParseError::UnmatchedBlockEnd {
                directive: directive.to_string(),
                offset: self.pos,
            });
        }
        self.consume_line();
        Ok(())
    }

    /// `%%SRC_EMBED lang`: raw text until `%%END_EMBED`, bypassing all other
    /// markup. Missing terminator fails the parse at the opening directive.
    fn verbatim_block(&mut self, lang: &str) -> ParseResult<()> {
        self.close_soft(Keep::None);
        let start = self.pos;
        self.consume_line();

        let body_start = self.pos;
        let mut body_end = None;
        while self.pos < self.chars.len() {
            let line_start = self.pos;
            let end = self.line_end();
            let line: String = self.chars[line_start..end].iter().collect();
            self.consume_line();
            if line.trim_end() == "%%END_EMBED" {
                body_end = Some(line_start);
                break;
            }
        }
        let Some(body_end) = body_end else {
            return Err(ParseError::UnterminatedVerbatim { offset: start });
        };

        let raw: String = self.chars[body_start..body_end].iter().collect();
        let mut pre = ElementNode::new("pre", Span::new(start, self.pos));
        pre.set_attr("class", "code");
        if !lang.is_empty() {
            pre.set_attr("data-lang", lang);
        }
        pre.push_child(Node::Text(TextNode::new(raw, Span::new(body_start, body_end))));
        self.append(Node::Element(pre));
        Ok(())
    }

    fn toc_placeholder(&mut self) {
        self.close_soft(Keep::None);
        let span = Span::new(self.pos, self.line_end());
        self.append(Node::Element(ElementNode::new("toc", span)));
        self.consume_line();
    }

    // ------------------------------------------------------------------
    // Single-line block constructs
    // ------------------------------------------------------------------

    fn heading_line(&mut self) -> ParseResult<()> {
        self.close_soft(Keep::None);
        let start = self.pos;
        let mut weight = 0;
        while self.cur() == Some('!') && weight < 4 {
            weight += 1;
            self.pos += 1;
        }
        while self.cur() == Some(' ') {
            self.pos += 1;
        }
        let tag = match weight {
            1 => "h2",
            2 => "h3",
            3 => "h4",
            _ => "h5",
        };
        self.open_element(FrameKind::Heading, tag, start);
        self.parse_inline_line()
    }

    fn rule_line(&mut self, width: usize) -> ParseResult<()> {
        self.close_soft(Keep::None);
        let span = Span::new(self.pos, self.pos + width);
        self.append(Node::Element(ElementNode::new("hr", span)));
        self.consume_line();
        Ok(())
    }

    fn table_line(&mut self) -> ParseResult<()> {
        self.close_soft(Keep::Table);
        let start = self.pos;
        if !self.has_frame(FrameKind::Table) {
            self.open_element(FrameKind::Table, "table", start);
        }
        self.open_element(FrameKind::Row, "tr", start);
        let pipes = self.count_run('|');
        self.pos += pipes;
        let tag = if pipes >= 2 { "th" } else { "td" };
        self.open_element(FrameKind::Cell, tag, start);
        self.parse_inline_line()
    }

    fn definition_line(&mut self) -> ParseResult<()> {
        self.close_soft(Keep::DefList);
        let start = self.pos;
        if !self.has_frame(FrameKind::DefList) {
            self.open_element(FrameKind::DefList, "dl", start);
        }
        self.pos += 1; // ';'
        while self.cur() == Some(' ') {
            self.pos += 1;
        }
        self.open_element(FrameKind::DefTerm, "dt", start);
        self.parse_inline_line()
    }

    fn quote_line(&mut self) -> ParseResult<()> {
        self.close_soft(Keep::Quote);
        let start = self.pos;
        if self.has_frame(FrameKind::Quote) {
            // Continued marker line: join with a literal newline.
            self.push_text('\n');
        } else {
            self.open_element(FrameKind::Quote, "blockquote", start);
        }
        self.pos += 1; // '>'
        if self.cur() == Some(' ') {
            self.pos += 1;
        }
        self.parse_inline_line()
    }

    fn preformatted_line(&mut self) -> ParseResult<()> {
        self.close_soft(Keep::Pre);
        let start = self.pos;
        if self.has_frame(FrameKind::Pre) {
            self.push_text('\n');
        } else {
            self.open_element(FrameKind::Pre, "pre", start);
        }
        self.pos += 1; // the marker space
        self.parse_inline_line()
    }

    fn paragraph_line(&mut self) -> ParseResult<()> {
        self.close_soft(Keep::Paragraph);
        if self.has_frame(FrameKind::Paragraph) {
            self.push_text('\n');
        } else {
            self.open_element(FrameKind::Paragraph, "p", self.pos);
        }
        self.parse_inline_line()
    }
}
