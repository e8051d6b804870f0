//! Text documents and source positions.
//!
//! Positions follow the editor protocol convention: zero-based lines and
//! zero-based character offsets counted in UTF-16 code units.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Position in a text document (line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based line number
    pub line: usize,
    /// Zero-based character offset in the line (UTF-16 code units)
    pub character: usize,
}

impl Position {
    /// Creates a new position
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Range in a text document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Range {
    /// Creates a new range
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates a range for a specific part of a line
    pub fn at_line(line: usize, start_char: usize, end_char: usize) -> Self {
        Self {
            start: Position::new(line, start_char),
            end: Position::new(line, end_char),
        }
    }

    /// Smallest range covering both `self` and `other`
    pub fn union(&self, other: &Range) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A document subject to parsing: its identity plus its full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    /// Identity of the document. File-backed documents use `file://` URIs.
    pub uri: Url,
    /// Full document content
    pub text: String,
}

impl TextDocument {
    /// Creates a document from an identity and its content
    pub fn new(uri: Url, text: impl Into<String>) -> Self {
        Self {
            uri,
            text: text.into(),
        }
    }

    /// Creates a document backed by an absolute file path.
    ///
    /// Returns `None` when `path` is not absolute.
    pub fn from_path(path: impl Into<PathBuf>, text: impl Into<String>) -> Option<Self> {
        let uri = Url::from_file_path(path.into()).ok()?;
        Some(Self::new(uri, text))
    }

    /// File system path of the document, if it is file-backed
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.uri.scheme() != "file" {
            return None;
        }
        self.uri.to_file_path().ok()
    }
}

/// Splits text on `\n` or `\r\n`. A trailing line terminator does not
/// produce an extra empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

/// Length of `text` in UTF-16 code units
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Range covering the whole of `line_text` on line `line`
pub fn line_range(line: usize, line_text: &str) -> Range {
    Range::at_line(line, 0, utf16_len(line_text))
}

/// Converts a byte span of `line_text` into a UTF-16 range on `line`
pub fn span_range(line: usize, line_text: &str, start: usize, end: usize) -> Range {
    let start_char = utf16_len(&line_text[..start]);
    let end_char = start_char + utf16_len(&line_text[start..end]);
    Range::at_line(line, start_char, end_char)
}
