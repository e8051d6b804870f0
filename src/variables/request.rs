//! Resolution of request variable paths against captured results.
//!
//! A request variable reference has the form
//! `{{name.(request|response).(headers|body).<rest>}}`. After the base name
//! is stripped, the remaining path (e.g. `response.body.$.user.id`) is
//! evaluated against the cached request/response pair:
//!
//! - `headers.<Name>` looks a header up, ignoring case
//! - `body.*` yields the whole body
//! - `body.<JSONPath>` queries a JSON body (`$.items[0].id`)
//!
//! Anything that cannot be resolved is reported through a [`ResolveResult`]
//! with a warning or error state rather than as a Rust error, because the
//! outcome ends up as an editor diagnostic.

use super::cache::RequestVariableCacheValue;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

static REQUEST_VARIABLE_PATH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(request|response)(?:\.(body|headers)(?:\.(.*))?)?)?$")
        .expect("Failed to compile request variable path regex")
});

/// Outcome classification of a resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveResult {
    pub state: ResolveState,
    /// Resolved value, when there is one
    pub value: Option<String>,
    /// User-facing explanation for warning and error states
    pub message: Option<String>,
}

impl ResolveResult {
    pub fn success(value: impl Into<String>) -> Self {
        Self {
            state: ResolveState::Success,
            value: Some(value.into()),
            message: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            state: ResolveState::Warning,
            value: None,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: ResolveState::Error,
            value: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == ResolveState::Success
    }
}

/// Evaluates a request variable path against a captured result.
pub trait RequestVariableResolver: Send + Sync {
    /// `path` is the reference with braces, base name and the following dot
    /// removed, e.g. `response.body.$.id`. It is empty for a bare `{{name}}`.
    fn resolve(&self, value: &RequestVariableCacheValue, path: &str) -> ResolveResult;
}

/// Default resolver for header, whole-body and JSONPath references.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponsePathResolver;

enum Entity<'a> {
    Request(&'a RequestVariableCacheValue),
    Response(&'a RequestVariableCacheValue),
}

impl<'a> Entity<'a> {
    fn label(&self) -> &'static str {
        match self {
            Entity::Request(_) => "Request",
            Entity::Response(_) => "Response",
        }
    }

    fn headers(&self) -> &'a HashMap<String, String> {
        match self {
            Entity::Request(value) => &value.request.headers,
            Entity::Response(value) => &value.response.headers,
        }
    }

    fn body(&self) -> Option<&'a str> {
        match self {
            Entity::Request(value) => value.request.body.as_deref(),
            Entity::Response(value) => Some(value.response.body.as_str()),
        }
        .filter(|body| !body.is_empty())
    }

    fn content_type(&self) -> Option<&'a str> {
        match self {
            Entity::Request(value) => value.request.content_type(),
            Entity::Response(value) => value.response.content_type(),
        }
    }
}

impl RequestVariableResolver for ResponsePathResolver {
    fn resolve(&self, value: &RequestVariableCacheValue, path: &str) -> ResolveResult {
        let Some(captures) = REQUEST_VARIABLE_PATH_REGEX.captures(path) else {
            return ResolveResult::error(format!(
                "Invalid request variable reference '{}'. Expected 'request' or 'response' followed by 'headers' or 'body'",
                path
            ));
        };

        let entity = match captures.get(1).map(|m| m.as_str()) {
            Some("request") => Entity::Request(value),
            Some(_) => Entity::Response(value),
            None => {
                return ResolveResult::warning(
                    "Http entity name 'request' or 'response' is missing",
                )
            }
        };

        let Some(part) = captures.get(2).map(|m| m.as_str()) else {
            return ResolveResult::warning(
                "HTTP entity part 'headers' or 'body' should follow the entity name",
            );
        };
        let selector = captures.get(3).map(|m| m.as_str()).unwrap_or("");

        if part == "headers" {
            resolve_header(&entity, selector)
        } else {
            resolve_body(&entity, selector)
        }
    }
}

fn resolve_header(entity: &Entity<'_>, name: &str) -> ResolveResult {
    if name.is_empty() {
        return ResolveResult::warning("Header name should follow 'headers'");
    }
    entity
        .headers()
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| ResolveResult::success(v.clone()))
        .unwrap_or_else(|| {
            ResolveResult::warning(format!("No value is resolved for header '{}'", name))
        })
}

fn resolve_body(entity: &Entity<'_>, path: &str) -> ResolveResult {
    if path.is_empty() {
        return ResolveResult::warning("Body path should follow 'body'");
    }
    let Some(body) = entity.body() else {
        return ResolveResult::warning(format!(
            "{} body of the given request doesn't exist",
            entity.label()
        ));
    };
    if path == "*" {
        return ResolveResult::success(body);
    }

    if !entity.content_type().map_or(false, is_json_content_type) {
        return ResolveResult::warning("Only JSON bodies can be queried");
    }

    let json: JsonValue = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(e) => {
            return ResolveResult::warning(format!("{} body is not valid JSON: {}", entity.label(), e))
        }
    };

    let Some(segments) = parse_jsonpath(path) else {
        return ResolveResult::warning(format!("Invalid JSONPath query '{}'", path));
    };

    match evaluate_jsonpath(&json, &segments) {
        Some(value) => ResolveResult::success(json_value_to_string(value)),
        None => ResolveResult::warning(format!("No value is resolved for JSONPath '{}'", path)),
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json" || media_type.ends_with("+json")
}

/// Represents a segment in a JSONPath expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    /// Object field access (e.g., "user", "name")
    Field(String),
    /// Array index access (e.g., [0], [5])
    ArrayIndex(usize),
}

/// Parses `$.user.name`, `$.items[0].id` or `$['user']` into segments.
/// Returns `None` for anything that is not a rooted, well-formed path.
fn parse_jsonpath(path: &str) -> Option<Vec<PathSegment>> {
    let rest = path.trim().strip_prefix('$')?;

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = rest.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current.is_empty() {
                    segments.push(PathSegment::Field(std::mem::take(&mut current)));
                } else if chars.peek().map_or(true, |next| *next == '.' || *next == '[') {
                    return None;
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(PathSegment::Field(std::mem::take(&mut current)));
                }
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(c) => inner.push(c),
                        None => return None,
                    }
                }
                let inner = inner.trim();
                if let Ok(index) = inner.parse::<usize>() {
                    segments.push(PathSegment::ArrayIndex(index));
                } else {
                    let quoted = inner
                        .strip_prefix('\'')
                        .and_then(|s| s.strip_suffix('\''))
                        .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')))?;
                    segments.push(PathSegment::Field(quoted.to_string()));
                }
            }
            ']' => return None,
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(PathSegment::Field(current));
    }

    Some(segments)
}

fn evaluate_jsonpath<'a>(json: &'a JsonValue, segments: &[PathSegment]) -> Option<&'a JsonValue> {
    segments.iter().try_fold(json, |current, segment| match segment {
        PathSegment::Field(name) => current.get(name.as_str()),
        PathSegment::ArrayIndex(index) => current.get(*index),
    })
}

/// Strings come back without quotes; objects and arrays as compact JSON.
fn json_value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HttpMethod, HttpRequest, HttpResponse};

    fn captured() -> RequestVariableCacheValue {
        let mut request = HttpRequest::new(
            "login.http_line_2".to_string(),
            HttpMethod::POST,
            "https://api.example.com/login".to_string(),
        );
        request.add_header("Content-Type".to_string(), "application/json".to_string());
        request.set_body(r#"{"user": "alice"}"#.to_string());

        let mut response = HttpResponse::new(200, "OK".to_string());
        response.add_header(
            "Content-Type".to_string(),
            "application/json; charset=utf-8".to_string(),
        );
        response.add_header("X-Request-Id".to_string(), "req-42".to_string());
        response.set_body(r#"{"token": "abc123", "user": {"id": 7, "roles": ["admin", "dev"]}}"#);

        RequestVariableCacheValue::new(request, response)
    }

    fn resolve(path: &str) -> ResolveResult {
        ResponsePathResolver.resolve(&captured(), path)
    }

    #[test]
    fn test_resolve_json_paths() {
        assert_eq!(resolve("response.body.$.token"), ResolveResult::success("abc123"));
        assert_eq!(resolve("response.body.$.user.id"), ResolveResult::success("7"));
        assert_eq!(
            resolve("response.body.$.user.roles[1]"),
            ResolveResult::success("dev")
        );
        assert_eq!(
            resolve("response.body.$['token']"),
            ResolveResult::success("abc123")
        );
        assert_eq!(
            resolve("response.body.$.user.roles"),
            ResolveResult::success(r#"["admin","dev"]"#)
        );
        assert_eq!(resolve("request.body.$.user"), ResolveResult::success("alice"));
    }

    #[test]
    fn test_resolve_headers_ignoring_case() {
        assert_eq!(
            resolve("response.headers.x-request-id"),
            ResolveResult::success("req-42")
        );
        let missing = resolve("response.headers.Location");
        assert_eq!(missing.state, ResolveState::Warning);
        assert!(missing.message.unwrap().contains("Location"));
    }

    #[test]
    fn test_whole_body() {
        let result = resolve("request.body.*");
        assert_eq!(result.value.as_deref(), Some(r#"{"user": "alice"}"#));
    }

    #[test]
    fn test_incomplete_paths_warn() {
        assert_eq!(
            resolve(""),
            ResolveResult::warning("Http entity name 'request' or 'response' is missing")
        );
        assert_eq!(resolve("response").state, ResolveState::Warning);
        assert_eq!(resolve("response.headers").state, ResolveState::Warning);
        assert_eq!(resolve("response.body").state, ResolveState::Warning);
    }

    #[test]
    fn test_malformed_reference_is_error() {
        let result = resolve("reply.body.$.token");
        assert_eq!(result.state, ResolveState::Error);
        assert!(result.message.unwrap().contains("reply.body.$.token"));

        assert_eq!(resolve("response.cookies.id").state, ResolveState::Error);
    }

    #[test]
    fn test_unresolvable_json_path_warns() {
        let result = resolve("response.body.$.missing");
        assert_eq!(result.state, ResolveState::Warning);
        assert_eq!(
            result.message.as_deref(),
            Some("No value is resolved for JSONPath '$.missing'")
        );

        let invalid = resolve("response.body.token");
        assert_eq!(invalid.state, ResolveState::Warning);
        assert!(invalid.message.unwrap().starts_with("Invalid JSONPath"));
    }

    #[test]
    fn test_non_json_body_cannot_be_queried() {
        let mut value = captured();
        value.response.headers.clear();
        value
            .response
            .add_header("Content-Type".to_string(), "application/xml".to_string());
        value.response.set_body("<token>abc</token>");

        let result = ResponsePathResolver.resolve(&value, "response.body.//token");
        assert_eq!(result.state, ResolveState::Warning);
        assert_eq!(
            result.message.as_deref(),
            Some("Only JSON bodies can be queried")
        );
    }

    #[test]
    fn test_missing_body_warns() {
        let mut value = captured();
        value.request.body = None;
        let result = ResponsePathResolver.resolve(&value, "request.body.$.user");
        assert_eq!(
            result.message.as_deref(),
            Some("Request body of the given request doesn't exist")
        );
    }

    #[test]
    fn test_parse_jsonpath_segments() {
        assert_eq!(
            parse_jsonpath("$.items[0].id"),
            Some(vec![
                PathSegment::Field("items".to_string()),
                PathSegment::ArrayIndex(0),
                PathSegment::Field("id".to_string()),
            ])
        );
        assert_eq!(parse_jsonpath("$"), Some(vec![]));
        assert_eq!(parse_jsonpath("items.id"), None);
        assert_eq!(parse_jsonpath("$.items[0"), None);
        assert_eq!(parse_jsonpath("$..id"), None);
    }
}
