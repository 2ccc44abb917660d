//! Workspace traversal and the per-directory rename pass.
//!
//! Starting from `data/chapters` and `data/snips`, every directory that has a
//! `.config` sidecar gets its tracked files renamed to timestamp-based names
//! and its sidecar rewritten. Directories without a sidecar end their branch
//! of the walk.

use crate::clock::TokenClock;
use crate::models::{ConfigFile, Entries, RenamedFile, naming};
use crate::{Error, Result, storage};
use serde::Serialize;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Chapters root, relative to the workspace root.
pub const CHAPTERS_DIR: &str = "data/chapters";

/// Snippets root, relative to the workspace root.
pub const SNIPS_DIR: &str = "data/snips";

/// Rename every tracked file of `config` and persist the new sidecar.
///
/// Renames happen in sidecar order. The first failure aborts the pass
/// without writing the sidecar, so files renamed before the failure are no
/// longer tracked by it.
pub fn perform_rename(
    config: &mut ConfigFile,
    clock: &mut dyn TokenClock,
) -> Result<Vec<RenamedFile>> {
    let mut renamed = Entries::with_capacity(config.len());
    let mut moves = Vec::with_capacity(config.len());

    for (filename, entry) in config.entries() {
        let new_name = naming::renamed(filename, clock.next_token());
        let from = config.directory().join(filename);
        let to = config.directory().join(&new_name);

        // fs::rename silently replaces files on unix
        if to.symlink_metadata().is_ok() {
            return Err(Error::TargetExists(to));
        }
        fs::rename(&from, &to).map_err(|source| Error::Rename {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        debug!(from = %from.display(), to = %to.display(), "renamed");

        moves.push(RenamedFile {
            from: filename.clone(),
            to: new_name.clone(),
        });
        renamed.insert(new_name, entry.clone());
    }

    config.replace_entries(renamed);
    storage::write_config(config)?;
    info!(
        sidecar = %config.sidecar_path().display(),
        renamed = moves.len(),
        "sidecar updated"
    );
    Ok(moves)
}

/// Outcome of one processed sidecar.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryReport {
    pub directory: PathBuf,
    pub renamed: Vec<RenamedFile>,
}

/// Outcome of a full workspace walk.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkspaceReport {
    pub root: PathBuf,
    /// Directories whose sidecar was rewritten, in visit order
    pub processed: Vec<DirectoryReport>,
    /// Visited directories without a sidecar
    pub skipped: Vec<PathBuf>,
}

impl WorkspaceReport {
    pub fn renamed_count(&self) -> usize {
        self.processed.iter().map(|d| d.renamed.len()).sum()
    }
}

/// Walk the workspace at `root` breadth-first and rename everything tracked.
///
/// Stops at the first error; nothing after it is visited.
pub fn analyze_workspace(root: &Path, clock: &mut dyn TokenClock) -> Result<WorkspaceReport> {
    let mut report = WorkspaceReport {
        root: root.to_path_buf(),
        ..Default::default()
    };
    let mut queue: VecDeque<PathBuf> =
        VecDeque::from([root.join(CHAPTERS_DIR), root.join(SNIPS_DIR)]);

    while let Some(directory) = queue.pop_front() {
        let Some(mut config) = storage::read_config(&directory)? else {
            debug!(directory = %directory.display(), "no sidecar, skipping");
            report.skipped.push(directory);
            continue;
        };

        let renamed = perform_rename(&mut config, clock)?;
        queue.extend(config.child_dirs());
        report.processed.push(DirectoryReport { directory, renamed });
    }

    info!(
        root = %root.display(),
        directories = report.processed.len(),
        renamed = report.renamed_count(),
        "workspace rename complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, SystemClock};
    use crate::models::ConfigEntry;
    use crate::test_utils::TestWorkspace;
    use std::collections::HashSet;

    fn sidecar_keys(dir: &Path) -> Vec<String> {
        storage::read_config(dir)
            .unwrap()
            .unwrap()
            .entries()
            .keys()
            .cloned()
            .collect()
    }

    #[test]
    fn test_perform_rename_renames_files_and_sidecar() {
        let ws = TestWorkspace::new();
        ws.write("snip-0001.wt", "one");
        ws.write("chap-0002", "two");
        ws.write_sidecar(
            "",
            r#"{
                "snip-0001.wt": {"title": "One", "ordering": 0},
                "chap-0002": {"title": "Two", "ordering": 1}
            }"#,
        );

        let mut config = storage::read_config(ws.path()).unwrap().unwrap();
        let mut clock = ManualClock::new(0xa0, 1);
        let moves = perform_rename(&mut config, &mut clock).unwrap();

        assert_eq!(
            moves,
            vec![
                RenamedFile {
                    from: "snip-0001.wt".into(),
                    to: "snip-a0.wt".into()
                },
                RenamedFile {
                    from: "chap-0002".into(),
                    to: "chap-a1".into()
                },
            ]
        );
        assert_eq!(ws.list(""), [".config", "chap-a1", "snip-a0.wt"]);
        assert_eq!(sidecar_keys(ws.path()), ["snip-a0.wt", "chap-a1"]);
        assert_eq!(
            fs::read_to_string(ws.path().join("chap-a1")).unwrap(),
            "two"
        );
    }

    #[test]
    fn test_perform_rename_keeps_entry_values() {
        let ws = TestWorkspace::new();
        ws.write("intro", "");
        ws.write_sidecar("", r#"{"intro": {"title": "Intro", "ordering": 7}}"#);

        let mut config = storage::read_config(ws.path()).unwrap().unwrap();
        perform_rename(&mut config, &mut ManualClock::new(0x10, 1)).unwrap();

        let reread = storage::read_config(ws.path()).unwrap().unwrap();
        assert_eq!(reread.entries()["intro-10"], ConfigEntry::new("Intro", 7));
        assert_eq!(reread.entries(), config.entries());
    }

    #[test]
    fn test_perform_rename_is_a_bijection() {
        let ws = TestWorkspace::new();
        let mut config = ConfigFile::new(ws.path());
        for i in 0..5 {
            let name = format!("snip-{}.wt", i);
            ws.write(&name, "");
            config.insert(name, ConfigEntry::new(format!("S{}", i), i));
        }
        storage::write_config(&config).unwrap();

        let moves = perform_rename(&mut config, &mut ManualClock::new(0x100, 1)).unwrap();

        let new_names: HashSet<&String> = moves.iter().map(|m| &m.to).collect();
        assert_eq!(new_names.len(), 5);
        let on_disk: HashSet<String> = ws
            .list("")
            .into_iter()
            .filter(|n| n != ".config")
            .collect();
        let keys: HashSet<String> = sidecar_keys(ws.path()).into_iter().collect();
        assert_eq!(on_disk, keys);
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn test_perform_rename_twice_never_repeats_a_name() {
        let ws = TestWorkspace::new();
        ws.write("snip-0001.wt", "");
        ws.write("chap-0002", "");
        ws.write_sidecar(
            "",
            r#"{
                "snip-0001.wt": {"title": "A", "ordering": 0},
                "chap-0002": {"title": "B", "ordering": 1}
            }"#,
        );

        let mut clock = SystemClock::new();
        let mut config = storage::read_config(ws.path()).unwrap().unwrap();
        let first = perform_rename(&mut config, &mut clock).unwrap();
        let second = perform_rename(&mut config, &mut clock).unwrap();

        let mut seen = HashSet::new();
        for name in first.iter().chain(second.iter()).map(|m| &m.to) {
            assert!(seen.insert(name.clone()), "{} produced twice", name);
        }
        assert!(second.iter().all(|m| m.to.starts_with("snip-") || m.to.starts_with("chap-")));
        assert!(second[0].to.ends_with(".wt"));
        assert!(!second[1].to.ends_with(".wt"));
    }

    #[test]
    fn test_perform_rename_missing_file_aborts_without_writing_sidecar() {
        let ws = TestWorkspace::new();
        ws.write("chap-1", "");
        let original = r#"{"chap-1": {"title": "A", "ordering": 0}, "gone-2": {"title": "B", "ordering": 1}, "chap-3": {"title": "C", "ordering": 2}}"#;
        let sidecar = ws.write_sidecar("", original);
        ws.write("chap-3", "");

        let mut config = storage::read_config(ws.path()).unwrap().unwrap();
        let err = perform_rename(&mut config, &mut ManualClock::new(0x50, 1)).unwrap_err();

        assert!(matches!(err, Error::Rename { .. }));
        assert_eq!(fs::read_to_string(sidecar).unwrap(), original);
        // chap-3 comes after the failure and is untouched
        assert_eq!(ws.list(""), [".config", "chap-3", "chap-50"]);
    }

    #[test]
    fn test_perform_rename_refuses_to_overwrite() {
        let ws = TestWorkspace::new();
        ws.write("chap-1", "mine");
        ws.write("chap-20", "someone else");
        ws.write_sidecar("", r#"{"chap-1": {"title": "A", "ordering": 0}}"#);

        let mut config = storage::read_config(ws.path()).unwrap().unwrap();
        let err = perform_rename(&mut config, &mut ManualClock::new(0x20, 1)).unwrap_err();

        assert!(matches!(err, Error::TargetExists(_)));
        assert_eq!(
            fs::read_to_string(ws.path().join("chap-20")).unwrap(),
            "someone else"
        );
        assert!(ws.path().join("chap-1").exists());
    }

    #[test]
    fn test_perform_rename_refuses_to_overwrite_pending_tracked_file() {
        let ws = TestWorkspace::new();
        ws.write("snip-0.wt", "zero");
        ws.write("snip-1.wt", "one");
        let original = r#"{"snip-0.wt": {"title": "Zero", "ordering": 0}, "snip-1.wt": {"title": "One", "ordering": 1}}"#;
        let sidecar = ws.write_sidecar("", original);

        let mut config = storage::read_config(ws.path()).unwrap().unwrap();
        // snip-0.wt would become snip-1.wt, which is still waiting its turn
        let err = perform_rename(&mut config, &mut ManualClock::new(1, 1)).unwrap_err();

        assert!(matches!(err, Error::TargetExists(ref p) if p.ends_with("snip-1.wt")));
        assert_eq!(fs::read_to_string(sidecar).unwrap(), original);
        assert_eq!(ws.list(""), [".config", "snip-0.wt", "snip-1.wt"]);
        assert_eq!(
            fs::read_to_string(ws.path().join("snip-1.wt")).unwrap(),
            "one"
        );
    }

    #[test]
    fn test_perform_rename_empty_sidecar_is_unchanged() {
        let ws = TestWorkspace::new();
        let sidecar = ws.write_sidecar("", "{}");

        let mut config = storage::read_config(ws.path()).unwrap().unwrap();
        let moves = perform_rename(&mut config, &mut ManualClock::new(1, 1)).unwrap();

        assert!(moves.is_empty());
        assert_eq!(fs::read_to_string(sidecar).unwrap(), "{}");
    }

    #[test]
    fn test_analyze_workspace_walks_nested_sidecars() {
        let ws = TestWorkspace::new();
        ws.write_sidecar(
            "data/chapters",
            r#"{"chapter-1": {"title": "Chapter", "ordering": 0}}"#,
        );
        ws.write_sidecar(
            "data/chapters/chapter-1",
            r#"{"fragment-1.wt": {"title": "Fragment", "ordering": 0}}"#,
        );
        ws.write("data/chapters/chapter-1/fragment-1.wt", "words");
        ws.write_sidecar(
            "data/chapters/chapter-1/snips",
            r#"{"snip-1": {"title": "Chapter snip", "ordering": 0}}"#,
        );
        ws.mkdir("data/chapters/chapter-1/snips/snip-1");
        ws.write_sidecar("data/snips", r#"{}"#);

        let mut clock = ManualClock::new(0x100, 1);
        let report = analyze_workspace(ws.path(), &mut clock).unwrap();

        assert_eq!(report.renamed_count(), 3);
        assert_eq!(ws.list("data/chapters"), [".config", "chapter-100"]);
        assert_eq!(
            ws.list("data/chapters/chapter-100"),
            [".config", "fragment-101.wt", "snips"]
        );
        assert_eq!(
            ws.list("data/chapters/chapter-100/snips"),
            [".config", "snip-102"]
        );
        // The renamed chapter dir is what gets enqueued
        assert_eq!(
            report.processed[2].directory,
            ws.path().join("data/chapters/chapter-100")
        );
        // snip-102 has no sidecar of its own
        assert_eq!(
            report.skipped,
            vec![ws.path().join("data/chapters/chapter-100/snips/snip-102")]
        );
    }

    #[test]
    fn test_analyze_workspace_without_data_dirs_does_nothing() {
        let ws = TestWorkspace::new();
        ws.write("stray-1", "");

        let report = analyze_workspace(ws.path(), &mut ManualClock::new(1, 1)).unwrap();

        assert!(report.processed.is_empty());
        assert_eq!(
            report.skipped,
            vec![ws.path().join(CHAPTERS_DIR), ws.path().join(SNIPS_DIR)]
        );
        assert_eq!(ws.list(""), ["stray-1"]);
    }

    #[test]
    fn test_analyze_workspace_does_not_descend_without_sidecar() {
        let ws = TestWorkspace::new();
        ws.mkdir("data/chapters");
        ws.write_sidecar(
            "data/chapters/snips",
            r#"{"snip-1": {"title": "Hidden", "ordering": 0}}"#,
        );
        ws.write("data/chapters/snips/snip-1", "");

        analyze_workspace(ws.path(), &mut ManualClock::new(1, 1)).unwrap();

        assert_eq!(ws.list("data/chapters/snips"), [".config", "snip-1"]);
    }

    #[test]
    fn test_analyze_workspace_stops_on_parse_error() {
        let ws = TestWorkspace::new();
        ws.write_sidecar("data/chapters", "{ broken");
        ws.write_sidecar("data/snips", r#"{"snip-1": {"title": "S", "ordering": 0}}"#);
        ws.write("data/snips/snip-1", "");

        let err = analyze_workspace(ws.path(), &mut ManualClock::new(1, 1)).unwrap_err();

        assert!(err.is_parse_error());
        assert_eq!(ws.list("data/snips"), [".config", "snip-1"]);
    }
}
