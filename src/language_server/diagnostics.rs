//! Variable diagnostics for .http documents
//!
//! Checks every `{{...}}` reference in a document against what the document
//! defines and against captured request results:
//! - references to names that are defined nowhere
//! - request variables whose request has not been sent yet
//! - request variable paths that do not resolve against the captured result

use crate::models::Range;
use crate::variables::{
    RequestVariableCache, RequestVariableCacheKey, RequestVariableResolver, ResolveState,
    VariableDefinitions, VariableKind, VariableReference, VariableReferences,
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use url::Url;

pub const UNDEFINED_VARIABLE: &str = "undefined-variable";
pub const REQUEST_NOT_SENT: &str = "request-not-sent";
pub const REQUEST_VARIABLE_UNRESOLVED: &str = "request-variable-unresolved";

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticSeverity {
    /// Error - code will not work correctly
    Error,
    /// Warning - code may work but has issues
    Warning,
    /// Info - informational message
    Info,
}

/// A diagnostic message for a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The range where the diagnostic applies
    pub range: Range,
    /// The severity of the diagnostic
    pub severity: DiagnosticSeverity,
    /// The diagnostic message
    pub message: String,
    /// Optional diagnostic code
    pub code: Option<String>,
    /// Optional related information or suggestions
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic
    pub fn error(range: Range, message: impl Into<String>) -> Self {
        Self::new(range, DiagnosticSeverity::Error, message)
    }

    /// Creates a new warning diagnostic
    pub fn warning(range: Range, message: impl Into<String>) -> Self {
        Self::new(range, DiagnosticSeverity::Warning, message)
    }

    fn new(range: Range, severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            range,
            severity,
            message: message.into(),
            code: None,
            suggestion: None,
        }
    }

    /// Sets the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets a suggestion for fixing the issue
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Computes variable diagnostics for the document at `document`.
///
/// Diagnostics come out grouped by check (undefined names, then unsent
/// requests, then unresolved paths) and, within a check, in reference
/// order. Only references whose primary kind is [`VariableKind::Request`]
/// are looked up in `cache`.
pub fn compute_diagnostics(
    document: &Url,
    definitions: &VariableDefinitions,
    references: &VariableReferences,
    cache: &dyn RequestVariableCache,
    resolver: &dyn RequestVariableResolver,
) -> Vec<Diagnostic> {
    let mut diagnostics = check_undefined_variables(definitions, references);
    diagnostics.extend(check_request_variables_sent(
        document,
        definitions,
        references,
        cache,
    ));
    diagnostics.extend(check_request_variables_resolved(
        document,
        definitions,
        references,
        cache,
        resolver,
    ));
    diagnostics
}

fn check_undefined_variables(
    definitions: &VariableDefinitions,
    references: &VariableReferences,
) -> Vec<Diagnostic> {
    references
        .iter()
        .filter(|(name, _)| !definitions.contains(name))
        .flat_map(|(name, occurrences)| {
            occurrences.iter().map(move |reference| {
                Diagnostic::error(reference.range, format!("{} is not found", name))
                    .with_code(UNDEFINED_VARIABLE)
                    .with_suggestion(format!(
                        "Define it with '@{} = value' or add it to the active environment",
                        name
                    ))
            })
        })
        .collect()
}

/// Names whose references resolve to a named request.
fn request_variables<'a>(
    definitions: &'a VariableDefinitions,
    references: &'a VariableReferences,
) -> impl Iterator<Item = (&'a str, &'a [VariableReference])> + 'a {
    references
        .iter()
        .filter(move |(name, _)| definitions.primary_kind(name) == Some(VariableKind::Request))
}

fn check_request_variables_sent(
    document: &Url,
    definitions: &VariableDefinitions,
    references: &VariableReferences,
    cache: &dyn RequestVariableCache,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (name, occurrences) in request_variables(definitions, references) {
        if cache.has(&RequestVariableCacheKey::new(name, document.clone())) {
            continue;
        }
        diagnostics.extend(occurrences.iter().map(|reference| {
            Diagnostic::error(reference.range, format!("Request '{}' has not been sent", name))
                .with_code(REQUEST_NOT_SENT)
        }));
    }

    diagnostics
}

fn check_request_variables_resolved(
    document: &Url,
    definitions: &VariableDefinitions,
    references: &VariableReferences,
    cache: &dyn RequestVariableCache,
    resolver: &dyn RequestVariableResolver,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (name, occurrences) in request_variables(definitions, references) {
        let Some(value) = cache.get(&RequestVariableCacheKey::new(name, document.clone())) else {
            continue;
        };

        for reference in occurrences {
            let result = resolver.resolve(&value, reference.path());
            let message = result.message.unwrap_or_default();
            let diagnostic = match result.state {
                ResolveState::Success => continue,
                ResolveState::Warning => Diagnostic::warning(reference.range, message),
                ResolveState::Error => Diagnostic::error(reference.range, message),
            };
            diagnostics.push(diagnostic.with_code(REQUEST_VARIABLE_UNRESOLVED));
        }
    }

    diagnostics
}

/// Latest published diagnostics per document.
///
/// Setting a document's diagnostics replaces its previous set entirely.
#[derive(Debug, Default)]
pub struct DiagnosticCollection {
    entries: DashMap<Url, Vec<Diagnostic>>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, uri: Url, diagnostics: Vec<Diagnostic>) {
        self.entries.insert(uri, diagnostics);
    }

    pub fn get(&self, uri: &Url) -> Vec<Diagnostic> {
        self.entries
            .get(uri)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn delete(&self, uri: &Url) {
        self.entries.remove(uri);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn uris(&self) -> Vec<Url> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
