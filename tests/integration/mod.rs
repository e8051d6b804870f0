//! Integration tests module for REST Client
//!
//! Shared helpers for tests that work on real files in a temporary
//! workspace.

pub mod end_to_end_test;
pub mod request_chaining_test;

use rest_client_core::models::TextDocument;
use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        log::set_max_level(log::LevelFilter::Debug);
    });
}

/// A temporary workspace with `.http` files written into it.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        init_test_env();
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Writes `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(path, content).expect("Failed to write test file");
        self
    }

    /// Opens `relative` as an editor document would.
    pub fn open(&self, relative: &str) -> TextDocument {
        let path = self.dir.path().join(relative);
        let text = fs::read_to_string(&path).expect("Failed to read test file");
        TextDocument::from_path(path, text).expect("Workspace paths are absolute")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
