//! CLI argument definitions for the wt-maint binaries.

use clap::Parser;
use std::path::PathBuf;

/// Version string with build metadata from `build.rs`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("WT_GIT_COMMIT"),
    ", built ",
    env!("WT_BUILD_TIMESTAMP"),
    ")"
);

/// Rename chapter and snippet files to timestamp-based names.
///
/// Walks `data/chapters` and `data/snips` under the workspace, renaming every
/// file tracked by a `.config` sidecar and rewriting the sidecar to match.
#[derive(Parser, Debug)]
#[command(name = "wt-rename")]
#[command(version, long_version = LONG_VERSION, about = "Rename tracked workspace files to timestamp-based names", long_about = None)]
pub struct RenameCli {
    /// Workspace root containing data/chapters and data/snips
    pub workspace: PathBuf,
}

/// Swap between the web extension and local desktop source layouts.
///
/// The layout found complete under its stash directory is moved into the
/// tree, and the current one is stashed in its place.
#[derive(Parser, Debug)]
#[command(name = "wt-swap")]
#[command(version, long_version = LONG_VERSION, about = "Swap between the web and local source layouts", long_about = None)]
pub struct SwapCli {
    /// Project root to swap in (defaults to the current directory)
    #[arg(short = 'C', long = "repo", env = "WT_SWAP_ROOT")]
    pub root: Option<PathBuf>,

    /// Layout config file (defaults to <root>/.wt-swap.toml, then built-in layouts)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show the planned moves without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the dependency reinstall after swapping
    #[arg(long)]
    pub no_install: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
