//! Syntax tree for `.http` documents.
//!
//! A document parses into a [`DocumentNode`] whose children are, in source
//! order, include directives, file variable definitions and request blocks:
//!
//! ```http
//! @@include shared/auth.http
//! @host = https://api.example.com
//!
//! # @name users
//! GET {{host}}/users
//! Authorization: Bearer {{token}}
//!
//! ###
//!
//! POST {{host}}/users
//! Content-Type: application/json
//!
//! {"name": "{{users.response.body.$[0].name}}"}
//! ```
//!
//! Includes are resolved eagerly and depth-first: by the time a tree is
//! returned, every transitively included document has been loaded and parsed
//! into the corresponding [`IncludeNode`]. A missing include target, an
//! include cycle or runaway nesting fails the whole parse with a
//! [`DocumentError`]. Everything else is permissive: lines that match no
//! directive are skipped.
//!
//! Request nodes keep their block text and only hand it to a
//! [`RequestTextParser`] when [`RequestNode::request`] is first called.

pub mod include;
mod lines;

pub use include::{
    resolve_include_path, DocumentError, DocumentLoader, FsLoader, LoadError, MemoryLoader,
};
pub use lines::is_comment_line;

use crate::models::{HttpRequest, Range, TextDocument};
use crate::parser::error::ParseError;
use crate::parser::{HttpRequestParser, RequestTextParser};
use lines::{scan_document, ScannedNode};
use once_cell::sync::OnceCell;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use url::Url;

/// Default limit on include nesting.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Discriminant of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Include,
    FileVariable,
    Request,
}

/// Root of a parsed document.
#[derive(Debug)]
pub struct DocumentNode {
    /// Identity of the document the children were parsed from
    pub uri: Url,
    /// Top-level nodes in source order
    pub children: Vec<Node>,
}

impl DocumentNode {
    /// Request nodes of this document, not including those of included documents
    pub fn requests(&self) -> impl Iterator<Item = &RequestNode> {
        self.children.iter().filter_map(|node| match node {
            Node::Request(request) => Some(request),
            _ => None,
        })
    }

    /// Include nodes of this document
    pub fn includes(&self) -> impl Iterator<Item = &IncludeNode> {
        self.children.iter().filter_map(|node| match node {
            Node::Include(include) => Some(include),
            _ => None,
        })
    }

    /// Whether `uri` is included by this document, directly or through
    /// nested includes.
    pub fn includes_document(&self, uri: &Url) -> bool {
        self.includes()
            .any(|include| include.document.uri == *uri || include.document.includes_document(uri))
    }
}

/// One parsed syntactic unit.
#[derive(Debug)]
pub enum Node {
    Include(IncludeNode),
    FileVariable(FileVariableNode),
    Request(RequestNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Include(_) => NodeKind::Include,
            Node::FileVariable(_) => NodeKind::FileVariable,
            Node::Request(_) => NodeKind::Request,
        }
    }

    /// Source range of the node in its owning document
    pub fn range(&self) -> Range {
        match self {
            Node::Include(node) => node.range,
            Node::FileVariable(node) => node.range,
            Node::Request(node) => node.range,
        }
    }
}

/// `@@include <path>`, together with the fully parsed included document.
#[derive(Debug)]
pub struct IncludeNode {
    /// The whole directive line
    pub range: Range,
    pub path: IncludePath,
    /// Parsed tree of the included document
    pub document: Box<DocumentNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludePath {
    /// Range of the path text only, for pointing diagnostics at it
    pub range: Range,
    /// Path as written in the directive
    pub relative_path: String,
    /// Path resolved against the including document's directory
    pub absolute_path: PathBuf,
}

/// `@key = value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileVariableNode {
    pub range: Range,
    pub key: String,
    pub value: String,
}

/// A request block.
#[derive(Debug)]
pub struct RequestNode {
    /// From the first to the last retained (non-comment, non-blank) line
    pub range: Range,
    /// Retained lines joined with the platform line terminator
    pub text: String,
    /// Request variable name declared with `# @name`
    pub name: Option<String>,
    file_path: PathBuf,
    parser: Arc<dyn RequestTextParser>,
    request: OnceCell<Result<HttpRequest, ParseError>>,
}

impl RequestNode {
    /// Parses the block text into a request on first call and returns the
    /// cached outcome afterwards.
    pub fn request(&self) -> Result<&HttpRequest, &ParseError> {
        self.request
            .get_or_init(|| self.parser.parse(&self.text, &self.file_path))
            .as_ref()
    }

    /// Whether [`RequestNode::request`] has already been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.request.get().is_some()
    }
}

/// Parses documents into trees, loading included documents through `L`.
#[derive(Debug)]
pub struct DocumentParser<L> {
    loader: L,
    request_parser: Arc<dyn RequestTextParser>,
    max_include_depth: usize,
}

impl<L: DocumentLoader> DocumentParser<L> {
    /// Creates a parser that evaluates request blocks with [`HttpRequestParser`].
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            request_parser: Arc::new(HttpRequestParser),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    /// Replaces the parser used when request nodes are dereferenced
    pub fn with_request_parser(mut self, parser: Arc<dyn RequestTextParser>) -> Self {
        self.request_parser = parser;
        self
    }

    pub fn with_max_include_depth(mut self, max_include_depth: usize) -> Self {
        self.max_include_depth = max_include_depth;
        self
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Parses `document` and every document it transitively includes.
    pub async fn parse(&self, document: &TextDocument) -> Result<DocumentNode, DocumentError> {
        log::debug!("Parsing document {}", document.uri);
        let mut resolving = Vec::new();
        self.parse_resolving(document.clone(), &mut resolving).await
    }

    /// `resolving` holds the file paths of the documents currently being
    /// parsed, outermost first.
    fn parse_resolving<'a>(
        &'a self,
        document: TextDocument,
        resolving: &'a mut Vec<PathBuf>,
    ) -> BoxFuture<'a, Result<DocumentNode, DocumentError>> {
        Box::pin(async move {
            let file_path = document.file_path();
            if let Some(path) = &file_path {
                resolving.push(path.clone());
            }
            let request_path = file_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(document.uri.path()));

            let mut children = Vec::new();
            for scanned in scan_document(&document) {
                let node = match scanned {
                    ScannedNode::Include {
                        range,
                        path_range,
                        relative_path,
                    } => {
                        let base = file_path.as_deref().ok_or_else(|| DocumentError::NotAFile {
                            uri: document.uri.clone(),
                        })?;
                        let absolute_path = resolve_include_path(base, &relative_path);
                        let included = self
                            .load_included(&document.uri, absolute_path.clone(), &resolving[..])
                            .await?;
                        let tree = self.parse_resolving(included, resolving).await?;

                        Node::Include(IncludeNode {
                            range,
                            path: IncludePath {
                                range: path_range,
                                relative_path,
                                absolute_path,
                            },
                            document: Box::new(tree),
                        })
                    }
                    ScannedNode::FileVariable { range, key, value } => {
                        Node::FileVariable(FileVariableNode { range, key, value })
                    }
                    ScannedNode::Request { range, text, name } => Node::Request(RequestNode {
                        range,
                        text,
                        name,
                        file_path: request_path.clone(),
                        parser: Arc::clone(&self.request_parser),
                        request: OnceCell::new(),
                    }),
                };
                children.push(node);
            }

            if file_path.is_some() {
                resolving.pop();
            }

            Ok::<_, DocumentError>(DocumentNode {
                uri: document.uri,
                children,
            })
        })
    }

    async fn load_included(
        &self,
        included_from: &Url,
        path: PathBuf,
        resolving: &[PathBuf],
    ) -> Result<TextDocument, DocumentError> {
        if resolving.contains(&path) {
            let mut chain = resolving.to_vec();
            chain.push(path);
            return Err(DocumentError::IncludeCycle { chain });
        }
        if resolving.len() > self.max_include_depth {
            return Err(DocumentError::IncludeDepthExceeded {
                path,
                max_depth: self.max_include_depth,
            });
        }

        log::debug!("Loading included document {}", path.display());
        let text = self
            .loader
            .load(&path)
            .await
            .map_err(|source| DocumentError::Load {
                path: path.clone(),
                included_from: included_from.clone(),
                source,
            })?;

        let uri = Url::from_file_path(&path).map_err(|_| DocumentError::NotAFile {
            uri: included_from.clone(),
        })?;
        Ok(TextDocument::new(uri, text))
    }
}

/// Parses `document`, reading included documents from disk.
pub async fn parse_document(document: &TextDocument) -> Result<DocumentNode, DocumentError> {
    DocumentParser::new(FsLoader).parse(document).await
}
