//! wt-maint - Maintenance tools for `.wt` writing workspaces.
//!
//! This library provides the core functionality for the `wt-rename` and
//! `wt-swap` binaries:
//! - sidecar-driven renaming of chapter and snippet files ([`workspace`])
//! - swapping between the web and local source layouts ([`layout`])

pub mod cli;
pub mod clock;
pub mod commands;
pub mod layout;
pub mod logging;
pub mod models;
pub mod storage;
pub mod workspace;

use std::path::PathBuf;

/// Test utilities for isolated workspace trees.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A throwaway workspace rooted in a temporary directory.
    pub struct TestWorkspace {
        pub root: TempDir,
    }

    impl TestWorkspace {
        pub fn new() -> Self {
            Self {
                root: TempDir::new().unwrap(),
            }
        }

        pub fn path(&self) -> &Path {
            self.root.path()
        }

        /// Create a directory (and parents) relative to the root.
        pub fn mkdir(&self, rel: &str) -> PathBuf {
            let dir = self.path().join(rel);
            fs::create_dir_all(&dir).unwrap();
            dir
        }

        /// Create a file with `contents`, creating parent directories as needed.
        pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
            let file = self.path().join(rel);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&file, contents).unwrap();
            file
        }

        /// Write a `.config` sidecar into `rel_dir`.
        pub fn write_sidecar(&self, rel_dir: &str, json: &str) -> PathBuf {
            let rel = if rel_dir.is_empty() {
                crate::models::SIDECAR_FILE_NAME.to_string()
            } else {
                format!("{}/{}", rel_dir, crate::models::SIDECAR_FILE_NAME)
            };
            self.write(&rel, json)
        }

        /// Sorted file names directly inside `rel_dir`.
        pub fn list(&self, rel_dir: &str) -> Vec<String> {
            let mut names: Vec<String> = fs::read_dir(self.path().join(rel_dir))
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
    }

    impl Default for TestWorkspace {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Library-level error type for wt-maint operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse sidecar {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid sidecar {}: {reason}", .path.display())]
    InvalidSidecar { path: PathBuf, reason: String },

    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Refusing to overwrite existing path: {}", .0.display())]
    TargetExists(PathBuf),

    #[error("Missing source path: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("Failed to parse layout config {}: {source}", .path.display())]
    LayoutConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid layout config: {0}")]
    InvalidLayout(String),

    #[error("Neither layout is fully stashed ({layouts}); nothing was moved")]
    LayoutBroken { layouts: String },

    #[error("Install step failed: {0}")]
    Install(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for errors caused by unreadable or malformed documents.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::Parse { .. }
                | Error::InvalidSidecar { .. }
                | Error::LayoutConfig { .. }
                | Error::InvalidLayout(_)
        )
    }
}

/// Result type alias for wt-maint operations.
pub type Result<T> = std::result::Result<T, Error>;
