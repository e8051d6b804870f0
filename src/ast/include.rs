//! Include resolution support: document loaders, path resolution and the
//! errors a structural load failure produces.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Loads the text of a document that another document includes.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<String, LoadError>;
}

#[async_trait]
impl<T: DocumentLoader + ?Sized> DocumentLoader for Arc<T> {
    async fn load(&self, path: &Path) -> Result<String, LoadError> {
        (**self).load(path).await
    }
}

/// Reads included documents from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

#[async_trait]
impl DocumentLoader for FsLoader {
    async fn load(&self, path: &Path) -> Result<String, LoadError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LoadError::from_io(path, e))?;
        Ok(strip_bom(text))
    }
}

/// Drops a leading UTF-8 byte-order mark so first-line directives match.
fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Serves documents from memory. Useful for unsaved buffers and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    documents: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a document
    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.documents.insert(path.into(), text.into());
    }

    /// Builder form of [`MemoryLoader::insert`]
    pub fn with(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }
}

#[async_trait]
impl DocumentLoader for MemoryLoader {
    async fn load(&self, path: &Path) -> Result<String, LoadError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(path.to_path_buf()))
    }
}

/// Why an included document could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The target does not exist
    NotFound(PathBuf),
    /// The target exists but could not be read
    Io {
        path: PathBuf,
        kind: io::ErrorKind,
        message: String,
    },
}

impl LoadError {
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                kind: error.kind(),
                message: error.to_string(),
            }
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            LoadError::Io { path, message, .. } => {
                write!(f, "Failed to read {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Structural failures that abort a document parse.
///
/// No partial tree is ever returned alongside one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// An included document could not be loaded
    Load {
        path: PathBuf,
        included_from: Url,
        source: LoadError,
    },
    /// A document includes itself, directly or transitively. `chain` lists
    /// the documents being resolved, ending with the repeated one.
    IncludeCycle { chain: Vec<PathBuf> },
    /// Includes nest deeper than the configured limit
    IncludeDepthExceeded { path: PathBuf, max_depth: usize },
    /// The document has no file system location to resolve includes against
    NotAFile { uri: Url },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Load {
                path,
                included_from,
                source,
            } => write!(
                f,
                "Cannot include '{}' from {}: {}",
                path.display(),
                included_from,
                source
            ),
            DocumentError::IncludeCycle { chain } => {
                let chain = chain
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                write!(f, "Include cycle detected: {}", chain)
            }
            DocumentError::IncludeDepthExceeded { path, max_depth } => write!(
                f,
                "Include of '{}' exceeds the maximum include depth of {}",
                path.display(),
                max_depth
            ),
            DocumentError::NotAFile { uri } => {
                write!(f, "Cannot resolve includes for non-file document {}", uri)
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Load { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Resolves an include path against the directory of the including document.
///
/// The result is normalized lexically (`.` dropped, `..` collapsed); the file
/// system is not consulted, so symlinks are not followed.
pub fn resolve_include_path(document_path: &Path, include_path: &str) -> PathBuf {
    let base = document_path.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&base.join(include_path))
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
