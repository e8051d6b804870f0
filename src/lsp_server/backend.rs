//! LSP Backend Implementation for the REST Client language server
//!
//! Publishes variable diagnostics as documents open and change, offers
//! "Send Request" code lenses, and rechecks every open document when the
//! client reports that a named request has been executed.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CodeLens as LspCodeLens, CodeLensOptions, CodeLensParams, Command as LspCommand,
    Diagnostic as LspDiagnostic, DiagnosticRelatedInformation,
    DiagnosticSeverity as LspDiagnosticSeverity, DidChangeConfigurationParams,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    InitializeParams, InitializeResult, InitializedParams, Location, MessageType,
    NumberOrString, Position as LspPosition, Range as LspRange, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind, Url,
};
use tower_lsp::{Client, LanguageServer};

use super::document::DocumentManager;
use crate::ast::DocumentParser;
use crate::config::{get_config, load_config, AnalyzerConfig};
use crate::language_server::{
    codelens, CodeLens, Diagnostic, DiagnosticSeverity, VariableDiagnosticsProvider,
};
use crate::models::{HttpRequest, HttpResponse, Range, TextDocument};
use crate::variables::{InMemoryRequestCache, RequestVariableCacheKey, RequestVariableCacheValue};

/// Custom notification sent by the client after a request has run.
pub const REQUEST_EXECUTED_METHOD: &str = "restClient/requestExecuted";

type Analyzer = VariableDiagnosticsProvider<DocumentManager>;

/// Parameters of [`REQUEST_EXECUTED_METHOD`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestExecutedParams {
    /// `@name` of the request that ran
    pub name: String,
    /// Document declaring the request
    pub uri: Url,
    pub request: HttpRequest,
    pub response: HttpResponse,
}

/// LSP Backend for REST Client documents
pub struct Backend {
    /// LSP client for sending notifications to the editor
    client: Client,

    /// Open documents, also used to load included documents
    documents: DocumentManager,

    /// Last result of every executed named request
    cache: InMemoryRequestCache,

    /// Rebuilt whenever the configuration changes
    analyzer: RwLock<Arc<Analyzer>>,
}

impl Backend {
    /// Creates a new Backend instance
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rest_client_core::lsp_server::backend::{Backend, REQUEST_EXECUTED_METHOD};
    ///
    /// let (service, socket) = tower_lsp::LspService::build(Backend::new)
    ///     .custom_method(REQUEST_EXECUTED_METHOD, Backend::request_executed)
    ///     .finish();
    /// ```
    pub fn new(client: Client) -> Self {
        let documents = DocumentManager::new();
        let cache = InMemoryRequestCache::new();
        let analyzer = build_analyzer(&documents, &cache, &get_config());

        Self {
            client,
            documents,
            cache,
            analyzer: RwLock::new(Arc::new(analyzer)),
        }
    }

    pub fn documents(&self) -> &DocumentManager {
        &self.documents
    }

    pub fn cache(&self) -> &InMemoryRequestCache {
        &self.cache
    }

    fn analyzer(&self) -> Arc<Analyzer> {
        match self.analyzer.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn reconfigure(&self, config: &AnalyzerConfig) {
        let analyzer = Arc::new(build_analyzer(&self.documents, &self.cache, config));
        match self.analyzer.write() {
            Ok(mut guard) => *guard = analyzer,
            Err(poisoned) => *poisoned.into_inner() = analyzer,
        }
    }

    /// Logs a message to the client
    async fn log_message(&self, typ: MessageType, message: impl std::fmt::Display) {
        self.client.log_message(typ, message).await;
    }

    async fn log_info(&self, message: impl std::fmt::Display) {
        self.log_message(MessageType::INFO, message).await;
    }

    async fn log_warn(&self, message: impl std::fmt::Display) {
        self.log_message(MessageType::WARNING, message).await;
    }

    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>) {
        let items = diagnostics
            .into_iter()
            .map(|diagnostic| to_lsp_diagnostic(&uri, diagnostic))
            .collect();
        self.client.publish_diagnostics(uri, items, None).await;
    }

    /// Rechecks one document and publishes the result. Include failures are
    /// reported to the client log and leave the published set unchanged.
    async fn check_document(&self, document: &TextDocument) {
        if !get_config().diagnostics_enabled {
            self.publish(document.uri.clone(), Vec::new()).await;
            return;
        }

        match self.analyzer().check_variables(document).await {
            Ok(diagnostics) => self.publish(document.uri.clone(), diagnostics).await,
            Err(e) => {
                log::warn!("Could not check {}: {}", document.uri, e);
                self.log_warn(format!("Could not check {}: {}", document.uri, e))
                    .await;
            }
        }
    }

    async fn check_open_documents(&self) {
        for document in self.documents.all() {
            self.check_document(&document).await;
        }
    }

    /// Open documents other than `uri` that include it, directly or
    /// transitively. Documents whose includes fail to resolve are skipped.
    async fn dependents(&self, uri: &Url) -> Vec<TextDocument> {
        let analyzer = self.analyzer();
        let mut dependents = Vec::new();
        for document in self.documents.all() {
            if document.uri == *uri {
                continue;
            }
            if let Ok(tree) = analyzer.parser().parse(&document).await {
                if tree.includes_document(uri) {
                    dependents.push(document);
                }
            }
        }
        dependents
    }

    /// Handles [`REQUEST_EXECUTED_METHOD`]: records the result and rechecks
    /// every open document, since any of them may reference the request.
    pub async fn request_executed(&self, params: RequestExecutedParams) {
        log::info!("Request '{}' executed in {}", params.name, params.uri);

        self.cache.insert(
            RequestVariableCacheKey::new(params.name, params.uri),
            RequestVariableCacheValue::new(params.request, params.response),
        );
        self.check_open_documents().await;
    }
}

fn build_analyzer(
    documents: &DocumentManager,
    cache: &InMemoryRequestCache,
    config: &AnalyzerConfig,
) -> Analyzer {
    let parser =
        DocumentParser::new(documents.clone()).with_max_include_depth(config.max_include_depth);
    VariableDiagnosticsProvider::new(parser, Arc::new(cache.clone()))
        .with_environment(config.environment_variables.clone())
}

fn to_lsp_range(range: Range) -> LspRange {
    LspRange {
        start: LspPosition {
            line: range.start.line as u32,
            character: range.start.character as u32,
        },
        end: LspPosition {
            line: range.end.line as u32,
            character: range.end.character as u32,
        },
    }
}

fn to_lsp_diagnostic(uri: &Url, diagnostic: Diagnostic) -> LspDiagnostic {
    let severity = match diagnostic.severity {
        DiagnosticSeverity::Error => LspDiagnosticSeverity::ERROR,
        DiagnosticSeverity::Warning => LspDiagnosticSeverity::WARNING,
        DiagnosticSeverity::Info => LspDiagnosticSeverity::INFORMATION,
    };
    let range = to_lsp_range(diagnostic.range);

    let related_information = diagnostic.suggestion.map(|suggestion| {
        vec![DiagnosticRelatedInformation {
            location: Location {
                uri: uri.clone(),
                range,
            },
            message: suggestion,
        }]
    });

    LspDiagnostic {
        range,
        severity: Some(severity),
        code: diagnostic.code.map(NumberOrString::String),
        code_description: None,
        source: Some("rest-client".to_string()),
        message: diagnostic.message,
        related_information,
        tags: None,
        data: None,
    }
}

fn to_lsp_code_lens(lens: CodeLens) -> LspCodeLens {
    LspCodeLens {
        range: to_lsp_range(lens.range),
        command: lens.command.map(|command| LspCommand {
            title: command.title,
            command: command.command,
            arguments: command.arguments,
        }),
        data: None,
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.log_info(format!(
            "Initializing REST Client Language Server (process ID: {:?})",
            params.process_id
        ))
        .await;

        let settings = params
            .initialization_options
            .map(|options| serde_json::json!({ "rest-client": options }));
        match load_config(settings) {
            Ok(config) => self.reconfigure(&config),
            Err(e) => {
                log::warn!("{}", e);
                self.log_warn(format!("{}. Using defaults.", e)).await;
            }
        }

        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            code_lens_provider: Some(CodeLensOptions {
                resolve_provider: Some(false),
            }),
            ..Default::default()
        };

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "rest-client-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.log_info("REST Client Language Server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        log::info!("Shutting down REST Client Language Server");
        self.documents.clear();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        log::debug!("Document opened: {}", uri);

        self.documents.insert(uri.clone(), params.text_document.text);
        if let Some(document) = self.documents.get(&uri) {
            self.check_document(&document).await;
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        // Full sync: the last change carries the whole text
        let Some(change) = params.content_changes.into_iter().last() else {
            self.log_warn(format!("No content changes received for document: {}", uri))
                .await;
            return;
        };
        log::debug!("Document changed: {}", uri);

        if self.documents.update(uri.clone(), change.text.clone()).is_err() {
            self.documents.insert(uri.clone(), change.text);
        }
        if let Some(document) = self.documents.get(&uri) {
            self.check_document(&document).await;
        }

        // Open documents including this one see its new buffer text
        for dependent in self.dependents(&uri).await {
            log::debug!("Rechecking {} after change to included {}", dependent.uri, uri);
            self.check_document(&dependent).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        log::debug!("Document closed: {}", uri);

        if self.documents.remove(&uri).is_none() {
            self.log_warn(format!("Document not found when closing: {}", uri))
                .await;
        }
        self.analyzer().delete_document(&uri);
        self.publish(uri, Vec::new()).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        match load_config(Some(params.settings)) {
            Ok(config) => {
                self.reconfigure(&config);
                self.check_open_documents().await;
            }
            Err(e) => {
                log::warn!("{}", e);
                self.log_warn(e).await;
            }
        }
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<LspCodeLens>>> {
        let uri = params.text_document.uri;

        if !get_config().code_lens_enabled {
            return Ok(None);
        }

        let Some(document) = self.documents.get(&uri) else {
            self.log_warn(format!("Document not found for code lens: {}", uri))
                .await;
            return Ok(Some(Vec::new()));
        };

        let tree = match self.analyzer().parser().parse(&document).await {
            Ok(tree) => tree,
            Err(e) => {
                log::warn!("Could not parse {}: {}", uri, e);
                return Ok(Some(Vec::new()));
            }
        };

        let lenses: Vec<LspCodeLens> = codelens::provide_code_lens(&tree)
            .into_iter()
            .map(to_lsp_code_lens)
            .collect();
        log::debug!("Provided {} code lens(es) for {}", lenses.len(), uri);

        Ok(Some(lenses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language_server::{Command, SEND_REQUEST_COMMAND};
    use crate::models::HttpMethod;

    #[test]
    fn test_backend_builds_with_custom_method() {
        let (_service, _socket) = tower_lsp::LspService::build(Backend::new)
            .custom_method(REQUEST_EXECUTED_METHOD, Backend::request_executed)
            .finish();
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial_test::serial]
    async fn test_dependents_are_open_documents_including_the_changed_one() {
        let (service, _socket) = tower_lsp::LspService::new(Backend::new);
        let backend = service.inner();
        let uri = |path: &str| Url::from_file_path(path).unwrap();

        for (path, text) in [
            ("/work/vars.http", "@host = https://a.example\n"),
            ("/work/api.http", "@@include vars.http\nGET {{host}}\n"),
            ("/work/nested.http", "@@include api.http\n"),
            ("/work/other.http", "GET https://b.example\n"),
        ] {
            backend.documents().insert(uri(path), text.to_string());
        }

        let dependents: Vec<Url> = backend
            .dependents(&uri("/work/vars.http"))
            .await
            .into_iter()
            .map(|document| document.uri)
            .collect();
        assert_eq!(dependents, vec![uri("/work/api.http"), uri("/work/nested.http")]);

        assert!(backend.dependents(&uri("/work/other.http")).await.is_empty());
    }

    #[test]
    fn test_range_conversion() {
        let range = to_lsp_range(Range::at_line(5, 10, 50));
        assert_eq!(range.start, LspPosition::new(5, 10));
        assert_eq!(range.end, LspPosition::new(5, 50));
    }

    #[test]
    fn test_diagnostic_conversion() {
        let uri = Url::parse("file:///api.http").unwrap();
        let diagnostic = Diagnostic::warning(Range::at_line(1, 2, 7), "No value")
            .with_code("request-variable-unresolved")
            .with_suggestion("Send the request first");

        let lsp = to_lsp_diagnostic(&uri, diagnostic);
        assert_eq!(lsp.severity, Some(LspDiagnosticSeverity::WARNING));
        assert_eq!(
            lsp.code,
            Some(NumberOrString::String("request-variable-unresolved".to_string()))
        );
        assert_eq!(lsp.source.as_deref(), Some("rest-client"));
        let related = lsp.related_information.unwrap();
        assert_eq!(related[0].message, "Send the request first");
        assert_eq!(related[0].location.uri, uri);
    }

    #[test]
    fn test_code_lens_conversion() {
        let lens = CodeLens::new(Range::at_line(3, 0, 20)).with_command(
            Command::new(SEND_REQUEST_COMMAND, "Send Request: login").with_arguments(vec![
                serde_json::json!("file:///api.http"),
                serde_json::json!(3),
            ]),
        );

        let lsp = to_lsp_code_lens(lens);
        let command = lsp.command.unwrap();
        assert_eq!(command.command, "rest-client.send");
        assert_eq!(command.title, "Send Request: login");
        assert_eq!(command.arguments.unwrap()[1], serde_json::json!(3));
        assert_eq!(lsp.range.start.line, 3);
    }

    #[test]
    fn test_request_executed_params_deserialize() {
        let params: RequestExecutedParams = serde_json::from_value(serde_json::json!({
            "name": "login",
            "uri": "file:///api.http",
            "request": {
                "id": "api.http_line_2",
                "method": "POST",
                "url": "https://api.example.com/login",
                "http_version": "HTTP/1.1",
                "headers": {},
                "body": null,
                "line_number": 2,
                "file_path": "/api.http"
            },
            "response": {
                "status_code": 200,
                "status_text": "OK",
                "body": "{\"token\": \"t\"}"
            }
        }))
        .unwrap();

        assert_eq!(params.name, "login");
        assert_eq!(params.request.method, HttpMethod::POST);
        assert_eq!(params.response.status_code, 200);
    }
}
