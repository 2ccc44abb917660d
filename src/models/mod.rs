//! Data models for workspace sidecars.
//!
//! A `.config` sidecar sits next to the content files of one directory and
//! maps each file name to its display metadata:
//!
//! ```json
//! { "chap-0001": { "title": "Opening", "ordering": 0 } }
//! ```

pub mod naming;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the sidecar inside each governed directory.
pub const SIDECAR_FILE_NAME: &str = ".config";

/// Reserved child directory holding snippets; always a recursion candidate.
pub const SNIPS_SENTINEL: &str = "snips";

/// Display metadata for a single content file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Human-readable title
    pub title: String,
    /// Sort position among siblings
    pub ordering: i64,
}

impl ConfigEntry {
    pub fn new(title: impl Into<String>, ordering: i64) -> Self {
        Self {
            title: title.into(),
            ordering,
        }
    }
}

/// File name to metadata, in sidecar order.
pub type Entries = IndexMap<String, ConfigEntry>;

/// One parsed `.config` sidecar and the directory it governs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    directory: PathBuf,
    sidecar_path: PathBuf,
    entries: Entries,
}

impl ConfigFile {
    /// An empty sidecar model for `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        let sidecar_path = directory.join(SIDECAR_FILE_NAME);
        Self {
            directory,
            sidecar_path,
            entries: Entries::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn sidecar_path(&self) -> &Path {
        &self.sidecar_path
    }

    pub fn entries(&self) -> &Entries {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Track `filename`. A repeated name replaces the earlier entry in place.
    pub fn insert(&mut self, filename: impl Into<String>, entry: ConfigEntry) {
        self.entries.insert(filename.into(), entry);
    }

    /// Swap in a freshly built mapping, returning the old one.
    pub fn replace_entries(&mut self, entries: Entries) -> Entries {
        std::mem::replace(&mut self.entries, entries)
    }

    /// Subdirectories worth visiting: every tracked name plus [`SNIPS_SENTINEL`]
    /// that exists on disk as a directory.
    pub fn child_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        let candidates = self
            .entries
            .keys()
            .map(String::as_str)
            .chain(std::iter::once(SNIPS_SENTINEL));

        for name in candidates {
            let path = self.directory.join(name);
            if path.is_dir() && !dirs.contains(&path) {
                dirs.push(path);
            }
        }
        dirs
    }
}

/// One completed on-disk rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedFile {
    pub from: String,
    pub to: String,
}
