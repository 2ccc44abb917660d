//! Common test utilities for wt-maint integration tests.
//!
//! Provides `TestEnv`, a temporary project tree with helpers for laying out
//! workspace files and running the binaries against it.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A temporary directory acting as a workspace or project root.
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// A Command for `wt-rename`, with logging quiet unless a test opts in.
    pub fn wt_rename(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_wt-rename"));
        cmd.current_dir(self.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// A Command for `wt-swap` rooted at this environment.
    pub fn wt_swap(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_wt-swap"));
        cmd.current_dir(self.path());
        cmd.env_remove("RUST_LOG");
        cmd.env_remove("WT_SWAP_ROOT");
        cmd
    }

    /// Write `contents` to `rel`, creating parents.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path().join(rel).exists()
    }

    /// Sorted entry names directly inside `rel`.
    pub fn list(&self, rel: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path().join(rel))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Parse the `.config` sidecar in `rel`.
    pub fn sidecar(&self, rel: &str) -> serde_json::Value {
        let raw = self.read(&format!("{}/.config", rel));
        serde_json::from_str(&raw).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
