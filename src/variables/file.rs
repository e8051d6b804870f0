//! File variables: `@name = value` definitions gathered from a parsed
//! document and everything it includes.

use crate::ast::{DocumentNode, Node};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Accumulates file variable bindings over a resolved document tree.
///
/// Traversal is depth-first in source order. An include contributes its
/// definitions at the position of the directive, so a definition after the
/// include overrides one inside it and vice versa: the last definition
/// reached wins. Each document is visited at most once per collection.
#[derive(Debug, Default)]
pub struct FileVariableCollector {
    visited: HashSet<Url>,
    variables: HashMap<String, String>,
}

impl FileVariableCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the bindings visible in `document`.
    pub fn collect(mut self, document: &DocumentNode) -> HashMap<String, String> {
        self.visit(document);
        self.variables
    }

    fn visit(&mut self, document: &DocumentNode) {
        if !self.visited.insert(document.uri.clone()) {
            log::debug!("Skipping already visited document {}", document.uri);
            return;
        }

        for node in &document.children {
            match node {
                Node::Include(include) => self.visit(&include.document),
                Node::FileVariable(variable) => {
                    self.variables
                        .insert(variable.key.clone(), variable.value.clone());
                }
                Node::Request(_) => {}
            }
        }
    }
}

/// Collects the file variables visible in `document`.
///
/// # Examples
///
/// ```
/// use rest_client_core::ast::{DocumentParser, MemoryLoader};
/// use rest_client_core::models::TextDocument;
/// use rest_client_core::variables::collect_file_variables;
///
/// let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let document = TextDocument::new(
///     url::Url::parse("untitled:api.http").unwrap(),
///     "@host = https://api.example.com\nGET {{host}}/users",
/// );
/// let tree = runtime
///     .block_on(DocumentParser::new(MemoryLoader::new()).parse(&document))
///     .unwrap();
///
/// let variables = collect_file_variables(&tree);
/// assert_eq!(variables["host"], "https://api.example.com");
/// ```
pub fn collect_file_variables(document: &DocumentNode) -> HashMap<String, String> {
    FileVariableCollector::new().collect(document)
}
