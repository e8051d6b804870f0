//! Data models shared across the crate.
//!
//! Documents and source positions, plus the request and response values a
//! request block resolves to and a request variable captures.

pub mod document;
pub mod request;
pub mod response;

pub use document::{Position, Range, TextDocument};
pub use request::{HttpMethod, HttpRequest};
pub use response::HttpResponse;
