//! Responses captured for request variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A response received for an executed request.
///
/// Only the parts a request variable can reference are kept: status,
/// headers and the body text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code (e.g., 200, 404, 500).
    pub status_code: u16,

    /// HTTP status text (e.g., "OK", "Not Found").
    pub status_text: String,

    /// Response headers as key-value pairs.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Response body decoded as text. Empty when the server sent none.
    #[serde(default)]
    pub body: String,
}

impl HttpResponse {
    /// Creates a response with no headers and an empty body.
    pub fn new(status_code: u16, status_text: String) -> Self {
        Self {
            status_code,
            status_text,
            headers: HashMap::new(),
            body: String::new(),
        }
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

    pub fn add_header(&mut self, name: String, value: String) {
        self.headers.insert(name, value);
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_lookup() {
        let mut response = HttpResponse::new(200, "OK".to_string());
        assert_eq!(response.content_type(), None);

        response.add_header(
            "CONTENT-TYPE".to_string(),
            "application/json; charset=utf-8".to_string(),
        );
        assert_eq!(
            response.content_type(),
            Some("application/json; charset=utf-8")
        );
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let response: HttpResponse =
            serde_json::from_str(r#"{"status_code": 201, "status_text": "Created"}"#).unwrap();
        assert_eq!(response.status_code, 201);
        assert!(response.headers.is_empty());
        assert!(response.body.is_empty());
    }
}
