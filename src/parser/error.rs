//! Errors raised when a request block's text is turned into a request value.
//!
//! These never surface while a document is being parsed into a tree; they
//! are returned when a request node's value is first dereferenced.

use std::fmt;

/// Errors that can occur while parsing the text of one request block.
///
/// Line numbers are 1-based and relative to the block text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The request line names an unknown method.
    InvalidMethod { method: String, line: usize },

    /// The request target is neither an absolute http(s) URL nor a variable reference.
    InvalidUrl { url: String, line: usize },

    /// A header line is not of the form `Name: value`.
    InvalidHeader { header: String, line: usize },

    /// The request line has a method but no target.
    MissingUrl { line: usize },

    /// The block contains nothing but blank and comment lines.
    EmptyRequest { line: usize },
}

impl ParseError {
    /// Returns the line number associated with this error.
    pub fn line(&self) -> usize {
        match self {
            ParseError::InvalidMethod { line, .. }
            | ParseError::InvalidUrl { line, .. }
            | ParseError::InvalidHeader { line, .. }
            | ParseError::MissingUrl { line }
            | ParseError::EmptyRequest { line } => *line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidMethod { method, line } => write!(
                f,
                "Invalid HTTP method '{}' at line {}. Expected one of: GET, POST, PUT, DELETE, PATCH, OPTIONS, HEAD, TRACE, CONNECT",
                method, line
            ),
            ParseError::InvalidUrl { url, line } => write!(
                f,
                "Invalid URL '{}' at line {}. URL must start with http://, https:// or a {{{{variable}}}}",
                url, line
            ),
            ParseError::InvalidHeader { header, line } => write!(
                f,
                "Invalid header format '{}' at line {}. Expected format: 'Header-Name: value'",
                header, line
            ),
            ParseError::MissingUrl { line } => write!(
                f,
                "Missing URL in request line at line {}. Expected format: 'METHOD URL [HTTP/VERSION]'",
                line
            ),
            ParseError::EmptyRequest { line } => write!(f, "Empty request block at line {}", line),
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_line() {
        let err = ParseError::InvalidHeader {
            header: "oops".to_string(),
            line: 3,
        };
        assert_eq!(err.line(), 3);
        assert_eq!(ParseError::EmptyRequest { line: 1 }.line(), 1);
    }

    #[test]
    fn test_invalid_url_display_mentions_variables() {
        let err = ParseError::InvalidUrl {
            url: "example.com".to_string(),
            line: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("example.com"));
        assert!(msg.contains("{{variable}}"));
    }
}
