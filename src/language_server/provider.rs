//! Ties parsing, definition gathering and reference checking together for
//! whole documents, keeping the latest results in a [`DiagnosticCollection`].

use super::diagnostics::{compute_diagnostics, Diagnostic, DiagnosticCollection};
use crate::ast::{DocumentError, DocumentLoader, DocumentParser};
use crate::models::TextDocument;
use crate::variables::{
    collect_definitions, scan_references, RequestVariableCache, RequestVariableResolver,
    ResponsePathResolver,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use url::Url;

/// Computes and stores variable diagnostics per document.
pub struct VariableDiagnosticsProvider<L> {
    parser: DocumentParser<L>,
    cache: Arc<dyn RequestVariableCache>,
    resolver: Arc<dyn RequestVariableResolver>,
    environment: RwLock<HashMap<String, String>>,
    collection: DiagnosticCollection,
}

impl<L: DocumentLoader> VariableDiagnosticsProvider<L> {
    /// Creates a provider reading request results from `cache` and resolving
    /// them with the default [`ResponsePathResolver`].
    pub fn new(parser: DocumentParser<L>, cache: Arc<dyn RequestVariableCache>) -> Self {
        Self {
            parser,
            cache,
            resolver: Arc::new(ResponsePathResolver),
            environment: RwLock::new(HashMap::new()),
            collection: DiagnosticCollection::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn RequestVariableResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_environment(self, environment: HashMap<String, String>) -> Self {
        self.set_environment(environment);
        self
    }

    /// Replaces the active environment's variables.
    pub fn set_environment(&self, environment: HashMap<String, String>) {
        match self.environment.write() {
            Ok(mut guard) => *guard = environment,
            Err(poisoned) => *poisoned.into_inner() = environment,
        }
    }

    fn environment(&self) -> HashMap<String, String> {
        match self.environment.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn parser(&self) -> &DocumentParser<L> {
        &self.parser
    }

    pub fn collection(&self) -> &DiagnosticCollection {
        &self.collection
    }

    /// Rechecks `document`, replacing its stored diagnostics.
    ///
    /// Fails only when the document's includes cannot be resolved; the
    /// previously stored diagnostics are left untouched in that case.
    pub async fn check_variables(
        &self,
        document: &TextDocument,
    ) -> Result<Vec<Diagnostic>, DocumentError> {
        let tree = self.parser.parse(document).await?;
        let definitions = collect_definitions(&tree, &self.environment());
        let references = scan_references(&document.text);

        let diagnostics = compute_diagnostics(
            &document.uri,
            &definitions,
            &references,
            self.cache.as_ref(),
            self.resolver.as_ref(),
        );
        log::debug!(
            "{} variable diagnostic(s) for {}",
            diagnostics.len(),
            document.uri
        );

        self.collection
            .set(document.uri.clone(), diagnostics.clone());
        Ok(diagnostics)
    }

    /// Rechecks every document in turn. Documents whose includes fail to
    /// resolve are logged and skipped.
    pub async fn check_all<'a, I>(&self, documents: I) -> Vec<(Url, Vec<Diagnostic>)>
    where
        I: IntoIterator<Item = &'a TextDocument>,
    {
        let mut results = Vec::new();
        for document in documents {
            match self.check_variables(document).await {
                Ok(diagnostics) => results.push((document.uri.clone(), diagnostics)),
                Err(e) => log::warn!("Skipping diagnostics for {}: {}", document.uri, e),
            }
        }
        results
    }

    /// Forgets a closed document's diagnostics.
    pub fn delete_document(&self, uri: &Url) {
        self.collection.delete(uri);
    }
}
