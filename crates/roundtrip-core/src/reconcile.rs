//! Work-set computation.
//!
//! Two independent sources decide which files a run touches: the revision
//! diff since the last run and a scan for missing outputs. Both are pure
//! functions over path lists so they can be exercised without a corpus; the
//! `resolve_changes` wrapper is the only part that talks to version control.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use roundtrip_ingest::{ChangeSet, VersionControl};
use roundtrip_model::{ChangeStats, DatasetConfig, FileTask, GapStats, is_markup_file};

use crate::error::RunError;

/// Files selected by the change-set resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Added and modified markup files, sorted.
    pub work_set: Vec<PathBuf>,
    /// Deleted markup files. Reported only; outputs are left in place.
    pub deleted: Vec<PathBuf>,
    pub stats: ChangeStats,
}

/// Result of the output-gap scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapScan {
    pub selected: Vec<PathBuf>,
    pub stats: GapStats,
}

/// First-run resolution: every markup file in `listing` counts as added.
pub fn resolve_full_listing(listing: &[PathBuf]) -> Resolution {
    let work_set: Vec<PathBuf> = markup_paths(listing).into_iter().collect();
    Resolution {
        stats: ChangeStats {
            added: work_set.len(),
            modified: 0,
            deleted: 0,
        },
        work_set,
        deleted: Vec::new(),
    }
}

/// Incremental resolution from a revision diff.
///
/// Non-markup paths are dropped; the work set is `added ∪ modified`.
pub fn resolve_change_set(changes: &ChangeSet) -> Resolution {
    let added = markup_paths(&changes.added);
    let modified = markup_paths(&changes.modified);
    let deleted = markup_paths(&changes.deleted);

    let stats = ChangeStats {
        added: added.len(),
        modified: modified.len(),
        deleted: deleted.len(),
    };
    Resolution {
        work_set: added.union(&modified).cloned().collect(),
        deleted: deleted.into_iter().collect(),
        stats,
    }
}

fn markup_paths(paths: &[PathBuf]) -> BTreeSet<PathBuf> {
    paths
        .iter()
        .filter(|path| is_markup_file(path))
        .cloned()
        .collect()
}

/// Determine the files changed since `previous`.
///
/// Without a previous revision this falls back to the full `listing`.
/// Otherwise the history reaching `previous` is fetched if missing; failing
/// that is fatal because the diff could silently miss files.
pub fn resolve_changes<V: VersionControl + ?Sized>(
    vcs: &V,
    dataset: &DatasetConfig,
    listing: &[PathBuf],
    previous: Option<&str>,
    current: &str,
) -> Result<Resolution, RunError> {
    let Some(previous) = previous else {
        debug!("no previous revision, resolving from full listing");
        return Ok(resolve_full_listing(listing));
    };
    vcs.ensure_history_available(previous)?;
    let changes = vcs.diff(previous, current, &dataset.source_root)?;
    Ok(resolve_change_set(&changes))
}

/// Classify every file in `listing` by the state of its outputs.
///
/// `exists` is the filesystem probe. A file whose primary output exists is
/// done; one with only a failure marker is skipped unless `retry_failures`;
/// everything else is selected.
pub fn scan_output_gaps<F>(
    listing: &[PathBuf],
    dataset: &DatasetConfig,
    retry_failures: bool,
    exists: F,
) -> Result<GapScan, RunError>
where
    F: Fn(&Path) -> bool,
{
    let mut scan = GapScan::default();
    for path in listing {
        let task = FileTask::new(path, dataset)?;
        scan.stats.scanned += 1;
        if exists(&task.primary_output_path) {
            scan.stats.outputs_present += 1;
        } else if !retry_failures && exists(&task.failure_marker_path) {
            scan.stats.skipped_failures += 1;
        } else {
            scan.stats.selected += 1;
            scan.selected.push(task.input_path);
        }
    }
    Ok(scan)
}

/// Union of both work sets, deduplicated and sorted.
pub fn merge_work_sets(changed: &[PathBuf], gaps: &[PathBuf]) -> Vec<PathBuf> {
    changed
        .iter()
        .chain(gaps)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
