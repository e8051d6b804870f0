//! LSP server for .http files
//!
//! Exposes variable diagnostics and "Send Request" code lenses over the
//! Language Server Protocol using tower-lsp.

pub mod backend;
pub mod document;

pub use backend::{Backend, RequestExecutedParams, REQUEST_EXECUTED_METHOD};
pub use document::DocumentManager;
