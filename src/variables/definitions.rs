//! Variable definitions visible to a document, grouped by kind.

use super::file::collect_file_variables;
use crate::ast::DocumentNode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Where a variable name is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    /// Built-in dynamic variables such as `$guid`
    System,
    /// A named request whose captured response can be referenced
    Request,
    /// `@name = value` in the document or an included document
    File,
    /// The active environment
    Environment,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableKind::System => "System",
            VariableKind::Request => "Request",
            VariableKind::File => "File",
            VariableKind::Environment => "Environment",
        };
        f.write_str(name)
    }
}

/// Map from variable name to the kinds defining it.
///
/// Kinds are kept in precedence order; the first one is the definition a
/// reference actually resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableDefinitions {
    definitions: HashMap<String, Vec<VariableKind>>,
}

impl VariableDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `name` is defined by `kind`. Definitions added earlier
    /// take precedence over later ones.
    pub fn define(&mut self, name: impl Into<String>, kind: VariableKind) {
        let kinds = self.definitions.entry(name.into()).or_default();
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// All kinds defining `name`, highest precedence first
    pub fn kinds(&self, name: &str) -> &[VariableKind] {
        self.definitions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The kind a reference to `name` resolves to
    pub fn primary_kind(&self, name: &str) -> Option<VariableKind> {
        self.kinds(name).first().copied()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Gathers the definitions visible to the root of `document`.
///
/// Precedence: request names declared in the document itself, then file
/// variables (following includes), then the active environment.
pub fn collect_definitions(
    document: &DocumentNode,
    environment: &HashMap<String, String>,
) -> VariableDefinitions {
    let mut definitions = VariableDefinitions::new();

    for request in document.requests() {
        if let Some(name) = &request.name {
            definitions.define(name.clone(), VariableKind::Request);
        }
    }

    for name in collect_file_variables(document).into_keys() {
        definitions.define(name, VariableKind::File);
    }

    for name in environment.keys() {
        definitions.define(name.clone(), VariableKind::Environment);
    }

    definitions
}
