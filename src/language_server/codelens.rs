//! CodeLens provider for REST Client
//!
//! Places a clickable "Send Request" lens over every request block of a
//! parsed document. Requests that come from included documents get no lens
//! here; they are sent from their own document.

use crate::ast::DocumentNode;
use crate::models::Range;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Command identifier executed when a send lens is clicked
pub const SEND_REQUEST_COMMAND: &str = "rest-client.send";

/// Represents a command that can be executed from a CodeLens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// The command identifier
    pub command: String,
    /// Human-readable title shown in the lens
    pub title: String,
    /// Optional arguments to pass to the command
    pub arguments: Option<Vec<JsonValue>>,
}

impl Command {
    /// Creates a new command
    pub fn new(command: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            title: title.into(),
            arguments: None,
        }
    }

    /// Adds arguments to the command
    pub fn with_arguments(mut self, args: Vec<JsonValue>) -> Self {
        self.arguments = Some(args);
        self
    }
}

/// Represents a CodeLens in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeLens {
    /// The range where the CodeLens should appear
    pub range: Range,
    /// The command to execute when clicked
    pub command: Option<Command>,
}

impl CodeLens {
    /// Creates a new CodeLens
    pub fn new(range: Range) -> Self {
        Self {
            range,
            command: None,
        }
    }

    /// Sets the command for this CodeLens
    pub fn with_command(mut self, command: Command) -> Self {
        self.command = Some(command);
        self
    }
}

/// Provides one send lens per request of the root document.
///
/// The lens spans the request block; its command receives the document URI
/// and the zero-based first line of the block.
///
/// # Examples
/// ```
/// use rest_client_core::ast::{DocumentParser, MemoryLoader};
/// use rest_client_core::language_server::codelens::provide_code_lens;
/// use rest_client_core::models::TextDocument;
///
/// let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let document = TextDocument::new(
///     url::Url::parse("untitled:api.http").unwrap(),
///     "GET https://api.example.com\n###\n# @name create\nPOST https://api.example.com",
/// );
/// let tree = runtime
///     .block_on(DocumentParser::new(MemoryLoader::new()).parse(&document))
///     .unwrap();
///
/// let lenses = provide_code_lens(&tree);
/// assert_eq!(lenses.len(), 2);
/// assert_eq!(lenses[1].command.as_ref().unwrap().title, "Send Request: create");
/// ```
pub fn provide_code_lens(document: &DocumentNode) -> Vec<CodeLens> {
    document
        .requests()
        .map(|request| {
            let title = match &request.name {
                Some(name) => format!("Send Request: {}", name),
                None => "Send Request".to_string(),
            };
            let command = Command::new(SEND_REQUEST_COMMAND, title).with_arguments(vec![
                JsonValue::String(document.uri.to_string()),
                JsonValue::from(request.range.start.line),
            ]);
            CodeLens::new(request.range).with_command(command)
        })
        .collect()
}
