//! Request values produced from request block text.
//!
//! A `HttpRequest` is what a request node's raw text turns into once it is
//! dereferenced. Request variables capture one of these together with the
//! response it received.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    HEAD,
    TRACE,
    CONNECT,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::TRACE => "TRACE",
            HttpMethod::CONNECT => "CONNECT",
        }
    }

    /// Parses a method name, ignoring case.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            "HEAD" => Some(HttpMethod::HEAD),
            "TRACE" => Some(HttpMethod::TRACE),
            "CONNECT" => Some(HttpMethod::CONNECT),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request parsed from the text of one request block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// Identifier derived from the file name and request line number.
    pub id: String,

    pub method: HttpMethod,

    /// Target URL. Variable references (`{{host}}/users`) are kept verbatim.
    pub url: String,

    /// Optional version from the request line, e.g. `HTTP/1.1`.
    pub http_version: Option<String>,

    /// Headers as written in the block.
    pub headers: HashMap<String, String>,

    pub body: Option<String>,

    /// Line of the request line, 1-based and relative to the block text.
    pub line_number: usize,

    /// Document the block was parsed from.
    pub file_path: PathBuf,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    pub fn new(id: String, method: HttpMethod, url: String) -> Self {
        Self {
            id,
            method,
            url,
            http_version: None,
            headers: HashMap::new(),
            body: None,
            line_number: 0,
            file_path: PathBuf::new(),
        }
    }

    pub fn add_header(&mut self, name: String, value: String) {
        self.headers.insert(name, value);
    }

    pub fn set_body(&mut self, body: String) {
        self.body = Some(body);
    }

    /// Looks up a header value, ignoring the case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_from_str_ignores_case() {
        assert_eq!(HttpMethod::from_str("get"), Some(HttpMethod::GET));
        assert_eq!(HttpMethod::from_str("Patch"), Some(HttpMethod::PATCH));
        assert_eq!(HttpMethod::from_str("FETCH"), None);
    }

    #[test]
    fn test_http_method_display() {
        assert_eq!(format!("{}", HttpMethod::DELETE), "DELETE");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut request = HttpRequest::new(
            "api.http_line_1".to_string(),
            HttpMethod::POST,
            "{{host}}/users".to_string(),
        );
        request.add_header("Content-Type".to_string(), "application/json".to_string());

        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.content_type(), Some("application/json"));
        assert_eq!(request.header("Accept"), None);
    }

    #[test]
    fn test_request_serializes_for_notifications() {
        let mut request = HttpRequest::new(
            "login.http_line_1".to_string(),
            HttpMethod::POST,
            "https://api.example.com/login".to_string(),
        );
        request.set_body(r#"{"user": "alice"}"#.to_string());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["method"], "POST");

        let back: HttpRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }
}
