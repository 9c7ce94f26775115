//! Parse failure types
//!
//! Only structural grammar violations abort a parse: unterminated bracket or
//! verbatim spans, end directives with no matching opener, stray conditional
//! terminators, and non-tab content inside a tab group. Everything else the
//! engine can make sense of degrades leniently (literal echo or an inline
//! error marker) instead of failing.
//!
//! Every failure carries the character offset of the offending token so the
//! error reporter can annotate the source line it came from.

use std::fmt;

/// A structural parse failure: message plus character offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A `[` span with no matching `]` before end of input.
    UnterminatedBracket { offset: usize },
    /// A `%%SRC_EMBED` block with no `%%END_EMBED` line.
    UnterminatedVerbatim { offset: usize },
    /// A block end directive (`%%QUOTE_END`, `%%DIV_END`, `%%TAB_END`)
    /// whose block was never opened.
    UnmatchedBlockEnd { directive: String, offset: usize },
    /// An `[endif]` with no open `[if:...]`.
    StrayConditionalEnd { offset: usize },
    /// A `%%TAB name%` directive outside any tab group.
    TabOutsideGroup { offset: usize },
    /// A tab group containing something other than tabs.
    NonTabContent { offset: usize },
}

impl ParseError {
    /// Character offset of the offending token in the original source.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnterminatedBracket { offset }
            | ParseError::UnterminatedVerbatim { offset }
            | ParseError::UnmatchedBlockEnd { offset, .. }
            | ParseError::StrayConditionalEnd { offset }
            | ParseError::TabOutsideGroup { offset }
            | ParseError::NonTabContent { offset } => *offset,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnterminatedBracket { .. } => {
                write!(f, "bracket span is never closed")
            }
            ParseError::UnterminatedVerbatim { .. } => {
                write!(f, "%%SRC_EMBED block is missing its %%END_EMBED line")
            }
            ParseError::UnmatchedBlockEnd { directive, .. } => {
                write!(f, "{directive} without a matching opening directive")
            }
            ParseError::StrayConditionalEnd { .. } => {
                write!(f, "[endif] without a matching [if:...]")
            }
            ParseError::TabOutsideGroup { .. } => {
                write!(f, "%%TAB used outside of a tab group")
            }
            ParseError::NonTabContent { .. } => {
                write!(f, "tab groups may only contain %%TAB sections")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Result alias used throughout the parser and the document passes.
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_preserved() {
        let err = ParseError::UnmatchedBlockEnd {
            directive: "%%QUOTE_END".to_string(),
            offset: 42,
        };
        assert_eq!(err.offset(), 42);
        assert!(err.to_string().contains("%%QUOTE_END"));
    }
}
