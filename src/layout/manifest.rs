//! Layout manifests and their TOML configuration.
//!
//! A layout is a named set of files that can live either in the project tree
//! (active) or under its stash directory (stashed). Exactly two layouts are
//! configured and exactly one of them is active at a time.
//!
//! # TOML Schema
//!
//! ```toml
//! install = ["npm", "clean-install"]
//!
//! [[layout]]
//! name = "web"
//! stash_dir = ".web"
//! required = ["extension.ts"]
//!
//! [[layout.entry]]
//! stashed = "extension.ts"
//! active = "src/extension.ts"
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-local layout config picked up when no explicit path is given.
pub const LAYOUT_CONFIG_FILE: &str = ".wt-swap.toml";

/// One file or directory that moves with its layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Path inside the stash directory
    pub stashed: PathBuf,
    /// Path inside the project tree
    pub active: PathBuf,
}

impl LayoutEntry {
    pub fn new(stashed: impl Into<PathBuf>, active: impl Into<PathBuf>) -> Self {
        Self {
            stashed: stashed.into(),
            active: active.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    /// Stash directory, relative to the project root
    pub stash_dir: PathBuf,
    /// Files (relative to `stash_dir`) that must all exist for this layout
    /// to count as stashed
    pub required: Vec<PathBuf>,
    #[serde(rename = "entry", default)]
    pub entries: Vec<LayoutEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Reinstall command run after a swap: program followed by arguments
    pub install: Vec<String>,
    #[serde(rename = "layout")]
    pub layouts: Vec<Layout>,
}

impl LayoutConfig {
    /// The web extension and local desktop layouts of a `.wt` editor checkout.
    pub fn builtin() -> Self {
        let web = Layout {
            name: "web".to_string(),
            stash_dir: PathBuf::from(".web"),
            required: paths(&[
                "bufferSource.ts",
                "fetchSource.ts",
                "extension.ts",
                "package-lock.json",
                "package.json",
                ".vscode/extensions.json",
                ".vscode/launch.json",
                ".vscode/settings.json",
                ".vscode/tasks.json",
                "web/test/suite/extension.test.ts",
                "web/test/suite/index.ts",
                "tsconfig.json",
                "gitTransactions.ts",
                "workspaceClass.ts",
            ]),
            entries: vec![
                LayoutEntry::new("bufferSource.ts", "src/Buffer/bufferSource.ts"),
                LayoutEntry::new("fetchSource.ts", "src/Fetch/fetchSource.ts"),
                LayoutEntry::new("extension.ts", "src/extension.ts"),
                LayoutEntry::new("package-lock.json", "package-lock.json"),
                LayoutEntry::new("package.json", "package.json"),
                LayoutEntry::new(".vscode", ".vscode"),
                LayoutEntry::new("web", "src/web"),
                LayoutEntry::new("tsconfig.json", "tsconfig.json"),
                LayoutEntry::new("gitTransactions.ts", "src/gitTransactions.ts"),
                LayoutEntry::new("workspaceClass.ts", "src/workspace/workspaceClass.ts"),
            ],
        };

        let local = Layout {
            name: "local".to_string(),
            stash_dir: PathBuf::from(".local"),
            required: paths(&[
                "bufferSource.ts",
                "fetchSource.ts",
                "extension.ts",
                "package-lock.json",
                "package.json",
                ".vscode/extensions.json",
                ".vscode/launch.json",
                ".vscode/settings.json",
                ".vscode/tasks.json",
                "tsconfig.json",
                "export/exportDocuments.ts",
                "export/exportFormView.ts",
                "import/importDropProvider.ts",
                "import/importFiles.ts",
                "import/importFileSystemView.ts",
                "import/importFormView.ts",
                "importExport/types.ts",
                "importExport/exportWorkspace.ts",
                "importExport/importWorkspace.ts",
                "gitTransactions.ts",
                "ttsDebugger/debugger/activateTTSDebug.ts",
                "ttsDebugger/debugger/debugAdapter.ts",
                "ttsDebugger/debugger/debugExtention.ts",
                "ttsDebugger/debugger/ttsDebug.ts",
                "ttsDebugger/debugger/ttsRuntime.ts",
                "ttsDebugger/debugSession.ts",
                "ttsDebugger/tts/tts.ts",
                "ttsDebugger/tts/windows.ts",
                "ttsDebugger/tts/windowsCommand.ts",
                "workspaceClass.ts",
            ]),
            entries: vec![
                LayoutEntry::new("bufferSource.ts", "src/Buffer/bufferSource.ts"),
                LayoutEntry::new("fetchSource.ts", "src/Fetch/fetchSource.ts"),
                LayoutEntry::new("extension.ts", "src/extension.ts"),
                LayoutEntry::new("package-lock.json", "package-lock.json"),
                LayoutEntry::new("package.json", "package.json"),
                LayoutEntry::new(".vscode", ".vscode"),
                LayoutEntry::new("tsconfig.json", "tsconfig.json"),
                LayoutEntry::new("export", "src/export"),
                LayoutEntry::new("import", "src/import"),
                LayoutEntry::new("importExport", "src/workspace/importExport"),
                LayoutEntry::new("gitTransactions.ts", "src/gitTransactions.ts"),
                LayoutEntry::new("workspaceClass.ts", "src/workspace/workspaceClass.ts"),
                LayoutEntry::new("ttsDebugger", "src/ttsDebugger"),
            ],
        };

        Self {
            install: vec!["npm".to_string(), "clean-install".to_string()],
            layouts: vec![web, local],
        }
    }

    /// Parse and validate a TOML layout config.
    pub fn from_toml(raw: &str, path: &Path) -> Result<Self> {
        let config: LayoutConfig = toml::from_str(raw).map_err(|source| Error::LayoutConfig {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config for `root`.
    ///
    /// Precedence: explicit path > `<root>/.wt-swap.toml` > built-in layouts.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let local = root.join(LAYOUT_CONFIG_FILE);
                if !local.is_file() {
                    debug!("using built-in layouts");
                    return Ok(Self::builtin());
                }
                local
            }
        };

        let raw = fs::read_to_string(&path).map_err(|source| Error::Filesystem {
            path: path.clone(),
            source,
        })?;
        debug!(config = %path.display(), "loading layout config");
        Self::from_toml(&raw, &path)
    }

    /// Check the invariants a swap relies on.
    pub fn validate(&self) -> Result<()> {
        if self.layouts.len() != 2 {
            return Err(Error::InvalidLayout(format!(
                "exactly two layouts are required, found {}",
                self.layouts.len()
            )));
        }
        if self.install.first().is_none_or(|program| program.is_empty()) {
            return Err(Error::InvalidLayout(
                "install command must name a program".to_string(),
            ));
        }

        let [first, second] = [&self.layouts[0], &self.layouts[1]];
        if first.name == second.name {
            return Err(Error::InvalidLayout(format!(
                "layout names must differ, both are '{}'",
                first.name
            )));
        }
        if first.stash_dir == second.stash_dir {
            return Err(Error::InvalidLayout(format!(
                "layouts '{}' and '{}' share stash dir {}",
                first.name,
                second.name,
                first.stash_dir.display()
            )));
        }

        for layout in &self.layouts {
            if layout.stash_dir.as_os_str().is_empty() {
                return Err(Error::InvalidLayout(format!(
                    "layout '{}' has an empty stash_dir",
                    layout.name
                )));
            }
            if layout.required.is_empty() {
                return Err(Error::InvalidLayout(format!(
                    "layout '{}' lists no required files",
                    layout.name
                )));
            }
            for entry in &layout.entries {
                if entry.stashed.as_os_str().is_empty() || entry.active.as_os_str().is_empty() {
                    return Err(Error::InvalidLayout(format!(
                        "layout '{}' has an entry with an empty path",
                        layout.name
                    )));
                }
            }
            check_disjoint(&layout.name, layout.entries.iter().map(|e| e.active.as_path()))?;
            check_disjoint(&layout.name, layout.entries.iter().map(|e| e.stashed.as_path()))?;
        }
        Ok(())
    }

    pub fn layout_names(&self) -> String {
        self.layouts
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// Moving a path and one inside it would move the inner path twice
fn check_disjoint<'a>(layout: &str, paths: impl Iterator<Item = &'a Path>) -> Result<()> {
    let paths: Vec<&Path> = paths.collect();
    for (i, a) in paths.iter().enumerate() {
        for b in &paths[i + 1..] {
            if a == b {
                return Err(Error::InvalidLayout(format!(
                    "layout '{}' lists {} twice",
                    layout,
                    a.display()
                )));
            }
            let (outer, inner) = if b.starts_with(a) { (a, b) } else { (b, a) };
            if inner.starts_with(outer) {
                return Err(Error::InvalidLayout(format!(
                    "layout '{}' lists {} inside {}",
                    layout,
                    inner.display(),
                    outer.display()
                )));
            }
        }
    }
    Ok(())
}

fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}
