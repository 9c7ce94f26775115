//! Character spans and offset-to-position conversion
//!
//! Spans are half-open `[start, end)` ranges of *character* offsets into the
//! original source text. The parser works character by character, so char
//! offsets are the natural unit; they also survive multi-byte punctuation in
//! the markup surface (`««`, `⸢⸢`, ...) without byte-boundary bookkeeping.

use serde::Serialize;
use std::fmt;

/// A half-open `[start, end)` range of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} past end {end}");
        Self { start, end }
    }

    /// Zero-width span at a single offset.
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Converts character offsets to 0-based line/column positions.
///
/// Built once per document; lookup is a binary search over line starts.
#[derive(Debug, Clone)]
pub struct SourceMap {
    line_starts: Vec<usize>,
    len: usize,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut len = 0;
        for (i, ch) in source.chars().enumerate() {
            len = i + 1;
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts, len }
    }

    /// Total number of characters in the source.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 0-based (line, column) of a character offset. Offsets at or past
    /// end-of-input clamp to the last position.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line, offset - self.line_starts[line])
    }
}
