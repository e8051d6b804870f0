//! Document Manager for the REST Client language server
//!
//! Tracks the text of open documents using DashMap for concurrent access.
//! The manager doubles as the include loader: an included file that is open
//! in the editor is read from its unsaved buffer, anything else from disk.

use crate::ast::{DocumentLoader, FsLoader, LoadError};
use crate::models::TextDocument;
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Error types for document operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreError {
    /// Document not found in the manager
    NotFound(Url),
}

impl std::fmt::Display for DocumentStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStoreError::NotFound(uri) => write!(f, "Document not found: {}", uri),
        }
    }
}

impl std::error::Error for DocumentStoreError {}

/// Thread-safe store of open documents.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct DocumentManager {
    documents: Arc<DashMap<Url, String>>,
}

impl DocumentManager {
    /// Creates a new DocumentManager instance
    ///
    /// # Examples
    ///
    /// ```
    /// use rest_client_core::lsp_server::document::DocumentManager;
    /// use url::Url;
    ///
    /// let manager = DocumentManager::new();
    /// let uri = Url::parse("file:///path/to/file.http").unwrap();
    /// manager.insert(uri.clone(), "GET https://example.com".to_string());
    /// assert_eq!(manager.get(&uri).unwrap().text, "GET https://example.com");
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document, replacing any previous content for `uri`.
    pub fn insert(&self, uri: Url, content: String) {
        self.documents.insert(uri, content);
    }

    /// Updates an existing document's content
    pub fn update(&self, uri: Url, content: String) -> Result<(), DocumentStoreError> {
        match self.documents.get_mut(&uri) {
            Some(mut entry) => {
                *entry.value_mut() = content;
                Ok(())
            }
            None => Err(DocumentStoreError::NotFound(uri)),
        }
    }

    /// Returns a snapshot of the document at `uri`.
    pub fn get(&self, uri: &Url) -> Option<TextDocument> {
        self.documents
            .get(uri)
            .map(|entry| TextDocument::new(uri.clone(), entry.value().clone()))
    }

    /// Removes a document, returning its last content
    pub fn remove(&self, uri: &Url) -> Option<String> {
        self.documents.remove(uri).map(|(_, content)| content)
    }

    /// Snapshots of every open document, ordered by URI.
    pub fn all(&self) -> Vec<TextDocument> {
        let mut documents: Vec<TextDocument> = self
            .documents
            .iter()
            .map(|entry| TextDocument::new(entry.key().clone(), entry.value().clone()))
            .collect();
        documents.sort_by(|a, b| a.uri.as_str().cmp(b.uri.as_str()));
        documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Clears all documents from the manager
    pub fn clear(&self) {
        self.documents.clear();
    }
}

#[async_trait]
impl DocumentLoader for DocumentManager {
    async fn load(&self, path: &Path) -> Result<String, LoadError> {
        let open = Url::from_file_path(path)
            .ok()
            .and_then(|uri| self.documents.get(&uri).map(|entry| entry.value().clone()));

        match open {
            Some(text) => {
                log::debug!("Loading {} from open buffer", path.display());
                Ok(text)
            }
            None => FsLoader.load(path).await,
        }
    }
}
