//! Line scanner for `.http` documents.
//!
//! A single forward cursor walks the document's lines and recognizes, in
//! priority order, include directives, file variable definitions and request
//! blocks. Includes are only *recognized* here; loading them is the job of
//! the async [`DocumentParser`](super::DocumentParser).

use crate::models::document::{line_range, span_range, split_lines};
use crate::models::{Range, TextDocument};
use once_cell::sync::Lazy;
use regex::Regex;

/// `@@include <path>`. Group 1 is the directive prefix, group 2 the path.
static INCLUDE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(@@include\s+)(.+?)\s*$").expect("Failed to compile include regex"));

/// `@key = value`
pub(crate) static FILE_VARIABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*@([^\s=]+)\s*=\s*(.*?)\s*$").expect("Failed to compile file variable regex")
});

/// Lines that close a request block: `###...` separators and `@` directives.
static REQUEST_END_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{3,}|^@").expect("Failed to compile request end regex"));

static COMMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(#|//)").expect("Failed to compile comment regex"));

/// `# @name login` / `// @name login`
static REQUEST_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:#+|/{2,})\s*@name\s+(\w+)\s*$").expect("Failed to compile @name regex")
});

#[cfg(windows)]
pub(crate) const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub(crate) const LINE_ENDING: &str = "\n";

/// Returns `true` for lines the request grammar treats as comments.
pub fn is_comment_line(line: &str) -> bool {
    COMMENT_REGEX.is_match(line)
}

/// A directive recognized on the current line, before include resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScannedNode {
    Include {
        range: Range,
        path_range: Range,
        relative_path: String,
    },
    FileVariable {
        range: Range,
        key: String,
        value: String,
    },
    Request {
        range: Range,
        text: String,
        name: Option<String>,
    },
}

/// Scans a whole document into its top-level directives, in source order.
pub(crate) fn scan_document(document: &TextDocument) -> Vec<ScannedNode> {
    LineScanner::new(&document.text).scan()
}

struct LineScanner<'a> {
    lines: Vec<&'a str>,
    current: usize,
}

impl<'a> LineScanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: split_lines(text),
            current: 0,
        }
    }

    fn has_reached_end(&self) -> bool {
        self.current >= self.lines.len()
    }

    fn current_line(&self) -> &'a str {
        self.lines[self.current]
    }

    fn scan(mut self) -> Vec<ScannedNode> {
        let mut nodes = Vec::new();

        while !self.has_reached_end() {
            while !self.has_reached_end() && self.current_line().trim().is_empty() {
                self.current += 1;
            }
            if self.has_reached_end() {
                break;
            }

            let node = self
                .try_include()
                .or_else(|| self.try_file_variable())
                .or_else(|| self.try_request());

            if let Some(node) = node {
                nodes.push(node);
            }
        }

        nodes
    }

    fn try_include(&mut self) -> Option<ScannedNode> {
        let line = self.current_line();
        let captures = INCLUDE_REGEX.captures(line)?;
        let path = captures.get(2)?;
        let line_number = self.current;
        self.current += 1;

        Some(ScannedNode::Include {
            range: line_range(line_number, line),
            path_range: span_range(line_number, line, path.start(), path.end()),
            relative_path: path.as_str().to_string(),
        })
    }

    fn try_file_variable(&mut self) -> Option<ScannedNode> {
        let line = self.current_line();
        let captures = FILE_VARIABLE_REGEX.captures(line)?;
        let line_number = self.current;
        self.current += 1;

        Some(ScannedNode::FileVariable {
            range: line_range(line_number, line),
            key: captures[1].to_string(),
            value: captures[2].to_string(),
        })
    }

    /// Consumes lines up to the next boundary. Always advances the cursor by
    /// at least one line, even when no node is produced.
    fn try_request(&mut self) -> Option<ScannedNode> {
        let start = self.current;
        let mut end = start;
        while end < self.lines.len() && !REQUEST_END_REGEX.is_match(self.lines[end]) {
            end += 1;
        }
        self.current = end.max(start + 1);

        let mut name = None;
        let mut retained: Vec<(usize, &str)> = Vec::new();
        for (line_number, line) in self.lines[start..end].iter().enumerate() {
            if is_comment_line(line) {
                if let Some(captures) = REQUEST_NAME_REGEX.captures(line) {
                    name = Some(captures[1].to_string());
                }
                continue;
            }
            retained.push((start + line_number, *line));
        }

        let first = retained.iter().position(|(_, line)| !line.trim().is_empty())?;
        let last = retained.iter().rposition(|(_, line)| !line.trim().is_empty())?;
        let retained = &retained[first..=last];

        let (first_line, first_text) = retained[0];
        let (last_line, last_text) = retained[retained.len() - 1];
        let range = line_range(first_line, first_text).union(&line_range(last_line, last_text));

        let text = retained
            .iter()
            .map(|(_, line)| *line)
            .collect::<Vec<_>>()
            .join(LINE_ENDING);

        Some(ScannedNode::Request { range, text, name })
    }
}
