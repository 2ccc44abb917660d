//! Swapping between two mutually exclusive source layouts.
//!
//! Whichever layout is fully present under its stash directory is the one to
//! bring in. The other layout's files are moved into their own stash
//! directory first, then the stashed files are moved into the tree. Nothing
//! moves unless one layout is complete and every move is known to be
//! possible.

pub mod manifest;

pub use manifest::{LAYOUT_CONFIG_FILE, Layout, LayoutConfig, LayoutEntry};

use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A single planned move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Move {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Everything needed to perform one swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapPlan {
    /// Layout currently in the tree, about to be stashed
    pub stashing: String,
    /// Layout currently stashed, about to be restored
    pub restoring: String,
    /// Stash dir that receives the outgoing layout
    pub stash_dir: PathBuf,
    /// Outgoing moves followed by incoming moves, in execution order
    pub moves: Vec<Move>,
}

/// Index of the first layout whose required files all exist in its stash.
pub fn detect_stashed(root: &Path, config: &LayoutConfig) -> Option<usize> {
    config.layouts.iter().position(|layout| {
        let stash = root.join(&layout.stash_dir);
        layout
            .required
            .iter()
            .all(|file| stash.join(file).is_file())
    })
}

/// Work out the moves for swapping layouts under `root`.
pub fn plan_swap(root: &Path, config: &LayoutConfig) -> Result<SwapPlan> {
    config.validate()?;
    let Some(index) = detect_stashed(root, config) else {
        return Err(Error::LayoutBroken {
            layouts: config.layout_names(),
        });
    };
    let stashed = &config.layouts[index];
    let active = &config.layouts[1 - index];

    let active_stash = root.join(&active.stash_dir);
    let stashed_stash = root.join(&stashed.stash_dir);

    let outgoing = active.entries.iter().map(|entry| Move {
        from: root.join(&entry.active),
        to: active_stash.join(&entry.stashed),
    });
    let incoming = stashed.entries.iter().map(|entry| Move {
        from: stashed_stash.join(&entry.stashed),
        to: root.join(&entry.active),
    });
    let moves: Vec<Move> = outgoing.chain(incoming).collect();

    Ok(SwapPlan {
        stashing: active.name.clone(),
        restoring: stashed.name.clone(),
        stash_dir: active_stash,
        moves,
    })
}

/// Check that every move in `plan` can run, in order, without clobbering.
///
/// A target may already exist only if an earlier move vacates it.
pub fn preflight(plan: &SwapPlan) -> Result<()> {
    let mut vacated: HashSet<&Path> = HashSet::new();
    let mut filled: HashSet<&Path> = HashSet::new();

    for mv in &plan.moves {
        let from_present = (exists(&mv.from) && !vacated.contains(mv.from.as_path()))
            || filled.contains(mv.from.as_path());
        if !from_present {
            return Err(Error::MissingSource(mv.from.clone()));
        }

        let to_occupied = (exists(&mv.to) && !vacated.contains(mv.to.as_path()))
            || filled.contains(mv.to.as_path());
        if to_occupied {
            return Err(Error::TargetExists(mv.to.clone()));
        }

        vacated.insert(mv.from.as_path());
        filled.remove(mv.from.as_path());
        filled.insert(mv.to.as_path());
        vacated.remove(mv.to.as_path());
    }
    Ok(())
}

// Broken symlinks count as present
fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Run the moves of `plan` after a successful [`preflight`].
pub fn execute_plan(plan: &SwapPlan) -> Result<()> {
    preflight(plan)?;

    fs::create_dir_all(&plan.stash_dir).map_err(|source| Error::Filesystem {
        path: plan.stash_dir.clone(),
        source,
    })?;

    for mv in &plan.moves {
        if let Some(parent) = mv.to.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Filesystem {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::rename(&mv.from, &mv.to).map_err(|source| Error::Rename {
            from: mv.from.clone(),
            to: mv.to.clone(),
            source,
        })?;
        debug!(from = %mv.from.display(), to = %mv.to.display(), "moved");
    }

    info!(
        stashed = %plan.stashing,
        restored = %plan.restoring,
        moves = plan.moves.len(),
        "layout swapped"
    );
    Ok(())
}

/// Run the configured reinstall command in `root`.
pub fn run_install(root: &Path, config: &LayoutConfig) -> Result<()> {
    let Some((program, args)) = config.install.split_first() else {
        return Err(Error::InvalidLayout(
            "install command must name a program".to_string(),
        ));
    };

    info!(command = %config.install.join(" "), "running install step");
    let status = Command::new(program)
        .args(args)
        .current_dir(root)
        .status()
        .map_err(|e| Error::Install(format!("Failed to run {}: {}", program, e)))?;

    if !status.success() {
        return Err(Error::Install(format!(
            "`{}` exited with {}",
            config.install.join(" "),
            status
        )));
    }
    Ok(())
}
