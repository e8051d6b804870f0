//! Configuration schema for the document analyzer.
//!
//! Defines the user-configurable settings and their validation.

use crate::ast::DEFAULT_MAX_INCLUDE_DEPTH;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Analyzer settings, read from the "rest-client" key of the editor's
/// settings. Missing settings fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerConfig {
    /// Whether variable diagnostics are published. Defaults to true.
    #[serde(default = "default_true")]
    pub diagnostics_enabled: bool,

    /// Whether "Send Request" code lenses are offered. Defaults to true.
    #[serde(default = "default_true")]
    pub code_lens_enabled: bool,

    /// How deeply `@@include` directives may nest before parsing fails.
    ///
    /// Must be at least 1. Defaults to 32.
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,

    /// Variables of the active environment. They count as defined for
    /// diagnostics but are shadowed by file variables and request names.
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            diagnostics_enabled: default_true(),
            code_lens_enabled: default_true(),
            max_include_depth: default_max_include_depth(),
            environment_variables: HashMap::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Validates the configuration and returns errors if any settings are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_include_depth == 0 {
            return Err("maxIncludeDepth must be greater than 0".to_string());
        }

        if let Some(name) = self
            .environment_variables
            .keys()
            .find(|name| !is_variable_name(name))
        {
            return Err(format!(
                "environment variable name '{}' may only contain letters, digits and '_'",
                name
            ));
        }

        Ok(())
    }
}

/// Names a `{{...}}` reference can spell.
fn is_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn default_true() -> bool {
    true
}

fn default_max_include_depth() -> usize {
    DEFAULT_MAX_INCLUDE_DEPTH
}
