//! Editor features for .http files
//!
//! - Variable diagnostics: undefined names, unsent requests and request
//!   variable paths that do not resolve
//! - CodeLens for clickable "Send Request" actions above each request
//!
//! These are protocol-agnostic; the `lsp_server` module (feature `lsp`)
//! exposes them over the Language Server Protocol.

pub mod codelens;
pub mod diagnostics;
pub mod provider;

pub use codelens::{provide_code_lens, CodeLens, Command, SEND_REQUEST_COMMAND};
pub use diagnostics::{
    compute_diagnostics, Diagnostic, DiagnosticCollection, DiagnosticSeverity,
};
pub use provider::VariableDiagnosticsProvider;
