//! Configuration management for the document analyzer.
//!
//! Configuration is read from the editor settings under the "rest-client"
//! key, merged with defaults and kept in a process-wide singleton.

pub mod schema;

pub use schema::AnalyzerConfig;

use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::RwLock;

/// Global configuration instance, updated when settings change.
static CONFIG: Lazy<RwLock<AnalyzerConfig>> =
    Lazy::new(|| RwLock::new(AnalyzerConfig::default()));

/// Loads configuration from a settings JSON value.
///
/// Reads the "rest-client" object, falls back to defaults for anything
/// missing or malformed, validates the result and updates the global
/// configuration.
///
/// # Example
///
/// ```
/// use rest_client_core::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "rest-client": {
///         "maxIncludeDepth": 8,
///         "environmentVariables": { "host": "https://api.example.com" }
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.max_include_depth, 8);
/// assert!(config.diagnostics_enabled);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<AnalyzerConfig, String> {
    let mut config = AnalyzerConfig::default();

    if let Some(settings) = settings_json.as_ref().and_then(|s| s.get("rest-client")) {
        match serde_json::from_value::<AnalyzerConfig>(settings.clone()) {
            Ok(user_config) => config = user_config,
            Err(e) => {
                log::warn!(
                    "Failed to parse rest-client settings: {}. Using defaults.",
                    e
                );
            }
        }
    }

    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = config.clone();
    }

    Ok(config)
}

/// Gets a copy of the current global configuration.
pub fn get_config() -> AnalyzerConfig {
    CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_else(|_| AnalyzerConfig::default())
}

/// Updates the global configuration in place.
///
/// If the result fails validation the configuration reverts to defaults.
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut AnalyzerConfig),
{
    if let Ok(mut config) = CONFIG.write() {
        updater(&mut config);

        if let Err(e) = config.validate() {
            log::warn!("Configuration validation failed after update: {}", e);
            *config = AnalyzerConfig::default();
        }
    }
}

/// Resets the configuration to defaults.
pub fn reset_config() {
    if let Ok(mut config) = CONFIG.write() {
        *config = AnalyzerConfig::default();
    }
}
