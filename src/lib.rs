//! Document analysis for REST Client `.http` files
//!
//! Parses HTTP script documents into a syntax tree, resolves `@@include`
//! directives, gathers file variables and reports variable references that
//! cannot be satisfied.
//!
//! # Architecture
//!
//! - **models**: Documents, positions, and the request/response types
//! - **parser**: Turns the text of one request block into an [`models::HttpRequest`]
//! - **ast**: Line scanner, include resolution and the document tree
//! - **variables**: File variables, `{{...}}` reference scanning, request
//!   variable cache and path resolution
//! - **language_server**: Variable diagnostics and "Send Request" code lenses
//! - **config**: Analyzer settings
//! - **lsp_server** (feature `lsp`): tower-lsp backend serving the above
//!
//! # Usage
//!
//! ```
//! use rest_client_core::ast::{DocumentParser, MemoryLoader};
//! use rest_client_core::language_server::compute_diagnostics;
//! use rest_client_core::models::TextDocument;
//! use rest_client_core::variables::{
//!     collect_definitions, scan_references, InMemoryRequestCache, ResponsePathResolver,
//! };
//! use std::collections::HashMap;
//!
//! let text = "@host = https://api.example.com\n\nGET {{host}}/users/{{userId}}\n";
//! let document = TextDocument::new(url::Url::parse("untitled:users.http").unwrap(), text);
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let tree = runtime
//!     .block_on(DocumentParser::new(MemoryLoader::new()).parse(&document))
//!     .unwrap();
//!
//! let definitions = collect_definitions(&tree, &HashMap::new());
//! let diagnostics = compute_diagnostics(
//!     &document.uri,
//!     &definitions,
//!     &scan_references(&document.text),
//!     &InMemoryRequestCache::new(),
//!     &ResponsePathResolver,
//! );
//!
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].message, "userId is not found");
//! ```

pub mod ast;
pub mod config;
pub mod language_server;
#[cfg(feature = "lsp")]
pub mod lsp_server;
pub mod models;
pub mod parser;
pub mod variables;
