//! Source code representation and error management.

use std::{fmt, ops::Range};

/// A byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    /// An empty span positioned at `offset`.
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Represents a syntax error (lexing or parsing).
///
/// Parsing stops at the first error, so a parse call produces at most one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("unexpected character `{found}`")]
    UnexpectedCharacter { offset: usize, found: char },

    #[error("unterminated string literal")]
    UnterminatedString { offset: usize },

    #[error("integer literal `{text}` is out of range")]
    IntegerOverflow { offset: usize, text: String },

    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("weight {value} is outside of the range 0.0..=1.0")]
    WeightOutOfRange { offset: usize, value: f64 },

    #[error("expression is nested too deeply")]
    NestingTooDeep { offset: usize },

    #[error("empty input")]
    EmptyInput,
}

impl SyntaxError {
    /// Create an expected-vs-found error.
    pub fn unexpected(expected: impl ToString, found: impl ToString, offset: usize) -> Self {
        Self::Unexpected {
            expected: expected.to_string(),
            found: found.to_string(),
            offset,
        }
    }

    /// Byte offset in the source where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::UnexpectedCharacter { offset, .. }
            | SyntaxError::UnterminatedString { offset }
            | SyntaxError::IntegerOverflow { offset, .. }
            | SyntaxError::Unexpected { offset, .. }
            | SyntaxError::WeightOutOfRange { offset, .. }
            | SyntaxError::NestingTooDeep { offset } => *offset,
            SyntaxError::EmptyInput => 0,
        }
    }
}

/// 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

/// Represents source code.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    /// Display name (file name, rule kind, `<input>`...).
    pub name: &'a str,
    /// Original source code.
    pub content: &'a str,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self {
            name: "<input>",
            content,
        }
    }

    pub fn with_name(name: &'a str, content: &'a str) -> Self {
        Self { name, content }
    }

    /// Resolves a byte offset to a line and column.
    /// Columns count characters, not bytes. Offsets past the end clamp to the end.
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.content.len());
        let before = &self.content[..floor_char_boundary(self.content, offset)];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        LineCol {
            line: before.matches('\n').count() + 1,
            col: before[line_start..].chars().count() + 1,
        }
    }

    /// Returns the full text of the line containing `offset`, without the line terminator.
    pub fn line_text(&self, offset: usize) -> &'a str {
        let offset = floor_char_boundary(self.content, offset.min(self.content.len()));
        let start = self.content[..offset].rfind('\n').map_or(0, |i| i + 1);
        let end = self.content[offset..]
            .find('\n')
            .map_or(self.content.len(), |i| offset + i);
        self.content[start..end].trim_end_matches('\r')
    }

    /// Renders `error` with its location and a caret under the offending column.
    pub fn render(&self, error: &SyntaxError) -> String {
        self.render_at(error, error.offset())
    }

    /// Renders any error message pointing at `offset`.
    pub fn render_at(&self, message: &dyn fmt::Display, offset: usize) -> String {
        Report {
            source: self,
            message,
            offset,
        }
        .to_string()
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

fn floor_char_boundary(s: &str, mut offset: usize) -> usize {
    while !s.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// An error message paired with the [`Source`] location it points at, for display.
pub struct Report<'s, 'a> {
    source: &'s Source<'a>,
    message: &'s dyn fmt::Display,
    offset: usize,
}

impl fmt::Display for Report<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let offset = self.offset;
        let LineCol { line, col } = self.source.line_col(offset);
        writeln!(f, "error: {}", self.message)?;
        writeln!(f, " --> {}:{}:{}", self.source.name, line, col)?;
        let gutter = line.to_string().len();
        writeln!(f, "{:gutter$} |", "", gutter = gutter)?;
        writeln!(f, "{} | {}", line, self.source.line_text(offset))?;
        write!(f, "{:gutter$} | {:>col$}", "", "^", gutter = gutter, col = col)
    }
}
