//! Request text parser.
//!
//! Turns the text of one request block (as retained by the document parser,
//! comment lines already removed) into a structured `HttpRequest`. The
//! document parser never calls this eagerly: a request node invokes its
//! `RequestTextParser` the first time its value is dereferenced.

pub mod error;

use crate::models::{HttpMethod, HttpRequest};
use error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Matches `METHOD URL [HTTP/VERSION]`.
static REQUEST_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+)\s+(\S+)(?:\s+(HTTP/\d+(?:\.\d+)?))?$")
        .expect("Failed to compile request line regex")
});

/// Converts raw request block text into a request value.
///
/// Implementations must be pure with respect to their inputs: a request node
/// caches the first result and never asks again.
pub trait RequestTextParser: Send + Sync + fmt::Debug {
    fn parse(&self, text: &str, file_path: &Path) -> Result<HttpRequest, ParseError>;
}

/// Default parser for the `.http` request grammar: request line, headers up
/// to the first blank line, then the body.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpRequestParser;

impl RequestTextParser for HttpRequestParser {
    fn parse(&self, text: &str, file_path: &Path) -> Result<HttpRequest, ParseError> {
        parse_request_text(text, file_path)
    }
}

/// Parses the text of a single request block.
///
/// # Examples
///
/// ```
/// use rest_client_core::parser::parse_request_text;
/// use std::path::Path;
///
/// let text = "POST https://api.example.com/users\nContent-Type: application/json\n\n{\"name\": \"John\"}";
/// let request = parse_request_text(text, Path::new("/work/api.http")).unwrap();
/// assert_eq!(request.headers.len(), 1);
/// assert!(request.body.unwrap().contains("John"));
/// ```
pub fn parse_request_text(text: &str, file_path: &Path) -> Result<HttpRequest, ParseError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .collect();
    parse_request(&lines, 1, file_path)
}

/// Parses numbered request lines into an `HttpRequest`.
///
/// `block_start` is reported when the block holds no request line at all.
pub fn parse_request(
    lines: &[(usize, &str)],
    block_start: usize,
    file_path: &Path,
) -> Result<HttpRequest, ParseError> {
    let request_idx = lines
        .iter()
        .position(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !is_comment(trimmed)
        })
        .ok_or(ParseError::EmptyRequest { line: block_start })?;

    let (request_line_num, request_line) = lines[request_idx];
    let (method, url, http_version) = parse_request_line(request_line, request_line_num)?;

    let mut header_lines = Vec::new();
    let mut body_start_idx = None;

    for (idx, (line_num, line)) in lines.iter().enumerate().skip(request_idx + 1) {
        let trimmed = line.trim();
        if is_comment(trimmed) {
            continue;
        }
        // First blank line separates headers from body
        if trimmed.is_empty() {
            body_start_idx = Some(idx + 1);
            break;
        }
        header_lines.push((*line_num, *line));
    }

    let headers = extract_headers(&header_lines)?;

    let body = body_start_idx.and_then(|start_idx| {
        let body_lines: Vec<&str> = lines[start_idx..].iter().map(|(_, line)| *line).collect();
        extract_body(&body_lines)
    });

    Ok(HttpRequest {
        id: generate_request_id(file_path, request_line_num),
        method,
        url,
        http_version,
        headers,
        body,
        line_number: request_line_num,
        file_path: file_path.to_path_buf(),
    })
}

/// Parses the request line into method, target and optional HTTP version.
///
/// Accepts `GET https://example.com`, `GET https://example.com HTTP/1.1`,
/// and a bare target (`https://example.com`), which defaults to GET.
pub fn parse_request_line(
    line: &str,
    line_num: usize,
) -> Result<(HttpMethod, String, Option<String>), ParseError> {
    let trimmed = line.trim();

    if let Some(captures) = REQUEST_LINE_REGEX.captures(trimmed) {
        let method_str = &captures[1];
        let method = HttpMethod::from_str(method_str).ok_or_else(|| ParseError::InvalidMethod {
            method: method_str.to_string(),
            line: line_num,
        })?;
        let url = validate_url(&captures[2], line_num)?;
        let http_version = captures.get(3).map(|m| m.as_str().to_string());
        return Ok((method, url, http_version));
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    match parts.as_slice() {
        [single] if HttpMethod::from_str(single).is_some() => {
            Err(ParseError::MissingUrl { line: line_num })
        }
        [single] => {
            let url = validate_url(single, line_num)?;
            Ok((HttpMethod::GET, url, None))
        }
        [] => Err(ParseError::MissingUrl { line: line_num }),
        [method, ..] if HttpMethod::from_str(method).is_none() => Err(ParseError::InvalidMethod {
            method: method.to_string(),
            line: line_num,
        }),
        [_, url, ..] => Err(ParseError::InvalidUrl {
            url: url.to_string(),
            line: line_num,
        }),
    }
}

fn validate_url(url: &str, line_num: usize) -> Result<String, ParseError> {
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("{{") {
        Ok(url.to_string())
    } else {
        Err(ParseError::InvalidUrl {
            url: url.to_string(),
            line: line_num,
        })
    }
}

/// Extracts `Name: value` headers. Blank lines are ignored.
pub fn extract_headers(lines: &[(usize, &str)]) -> Result<HashMap<String, String>, ParseError> {
    let mut headers = HashMap::new();

    for (line_num, line) in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                headers.insert(name.trim().to_string(), value.trim().to_string());
            }
            _ => {
                return Err(ParseError::InvalidHeader {
                    header: trimmed.to_string(),
                    line: *line_num,
                })
            }
        }
    }

    Ok(headers)
}

/// Joins body lines; `None` when the result is blank.
pub fn extract_body(lines: &[&str]) -> Option<String> {
    let body = lines.join("\n");
    if body.trim().is_empty() {
        None
    } else {
        Some(body)
    }
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with('#') || trimmed.starts_with("//")
}

fn generate_request_id(file_path: &Path, line_num: usize) -> String {
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");
    format!("{}_line_{}", file_name, line_num)
}
