//! Command implementations for the wt-maint binaries.
//!
//! This module contains the business logic behind each binary:
//! - `rename_workspace` - sidecar-driven renames (`wt-rename`)
//! - `swap_layout` - web/local layout swap (`wt-swap`)

use crate::clock::{SystemClock, TokenClock};
use crate::layout::{self, LayoutConfig, SwapPlan};
use crate::workspace::{self, WorkspaceReport};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Rename every tracked file under the workspace at `root`.
pub fn rename_workspace(root: &Path) -> Result<WorkspaceReport> {
    rename_workspace_with_clock(root, &mut SystemClock::new())
}

/// [`rename_workspace`] with an injected token source.
pub fn rename_workspace_with_clock(
    root: &Path,
    clock: &mut dyn TokenClock,
) -> Result<WorkspaceReport> {
    if !root.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Workspace root is not a directory: {}",
            root.display()
        )));
    }
    workspace::analyze_workspace(root, clock)
}

impl CommandResult for WorkspaceReport {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for dir in &self.processed {
            let shown = dir.directory.strip_prefix(&self.root).unwrap_or(&dir.directory);
            lines.push(format!("{}:", shown.display()));
            if dir.renamed.is_empty() {
                lines.push("  (no tracked files)".to_string());
            }
            for file in &dir.renamed {
                lines.push(format!("  {} -> {}", file.from, file.to));
            }
        }
        lines.push(format!(
            "Renamed {} file(s) across {} sidecar(s).",
            self.renamed_count(),
            self.processed.len()
        ));
        lines.join("\n")
    }
}

/// Options for [`swap_layout`].
#[derive(Debug, Clone, Default)]
pub struct SwapOptions {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub dry_run: bool,
    pub no_install: bool,
}

/// Outcome of a layout swap.
#[derive(Debug, Clone, Serialize)]
pub struct SwapResult {
    pub root: PathBuf,
    pub plan: SwapPlan,
    pub dry_run: bool,
    /// Whether the reinstall command ran
    pub installed: bool,
}

/// Swap the web and local layouts under `options.root`.
pub fn swap_layout(options: &SwapOptions) -> Result<SwapResult> {
    let config = LayoutConfig::load(&options.root, options.config.as_deref())?;
    let plan = layout::plan_swap(&options.root, &config)?;

    if options.dry_run {
        layout::preflight(&plan)?;
        return Ok(SwapResult {
            root: options.root.clone(),
            plan,
            dry_run: true,
            installed: false,
        });
    }

    layout::execute_plan(&plan)?;
    let installed = !options.no_install;
    if installed {
        layout::run_install(&options.root, &config)?;
    }

    Ok(SwapResult {
        root: options.root.clone(),
        plan,
        dry_run: false,
        installed,
    })
}

impl CommandResult for SwapResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let verb = if self.dry_run { "Would move" } else { "Moved" };
        let mut lines = vec![format!(
            "{} layout '{}' out and layout '{}' in:",
            if self.dry_run { "Plan: swap" } else { "Swapped" },
            self.plan.stashing,
            self.plan.restoring
        )];
        for mv in &self.plan.moves {
            let from = mv.from.strip_prefix(&self.root).unwrap_or(&mv.from);
            let to = mv.to.strip_prefix(&self.root).unwrap_or(&mv.to);
            lines.push(format!("  {} {} -> {}", verb, from.display(), to.display()));
        }
        if self.installed {
            lines.push("Dependencies reinstalled.".to_string());
        }
        lines.join("\n")
    }
}
