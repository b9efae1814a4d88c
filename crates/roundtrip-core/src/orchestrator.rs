//! One run over one category.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, info_span, warn};

use roundtrip_ingest::{VersionControl, list_markup_files};
use roundtrip_model::{ChangeStats, ConversionOutcome, DatasetConfig, FileTask, GapStats};
use roundtrip_service::ConversionService;
use roundtrip_state::{SaveOutcome, StateStore};

use crate::error::RunError;
use crate::pipeline::ConversionPipeline;
use crate::reconcile::{merge_work_sets, resolve_changes, scan_output_gaps};

/// Flags for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Re-attempt files whose only output is a failure marker.
    pub retry_failures: bool,
    /// Resolve the work set without converting or saving state.
    pub dry_run: bool,
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub category: String,
    pub previous_revision: Option<String>,
    pub revision: String,
    /// `None` when the revision was unchanged and change detection was skipped.
    pub changes: Option<ChangeStats>,
    pub gaps: GapStats,
    pub work_set: Vec<PathBuf>,
    pub succeeded: usize,
    pub skipped_no_fragment: usize,
    pub failed: usize,
    /// `None` for dry runs.
    pub state: Option<SaveOutcome>,
    pub dry_run: bool,
    pub elapsed: Duration,
}

impl RunReport {
    fn new(category: &str, previous_revision: Option<String>, revision: String) -> Self {
        Self {
            category: category.to_string(),
            previous_revision,
            revision,
            changes: None,
            gaps: GapStats::default(),
            work_set: Vec::new(),
            succeeded: 0,
            skipped_no_fragment: 0,
            failed: 0,
            state: None,
            dry_run: false,
            elapsed: Duration::ZERO,
        }
    }

    pub fn processed(&self) -> usize {
        self.succeeded + self.skipped_no_fragment + self.failed
    }
}

/// Drives reconciliation, the pipeline and state persistence for a category.
pub struct Orchestrator<'a, V: ?Sized, S: ?Sized> {
    category: &'a str,
    dataset: &'a DatasetConfig,
    vcs: &'a V,
    service: &'a S,
    state: &'a StateStore,
}

impl<'a, V, S> Orchestrator<'a, V, S>
where
    V: VersionControl + ?Sized,
    S: ConversionService + ?Sized,
{
    pub fn new(
        category: &'a str,
        dataset: &'a DatasetConfig,
        vcs: &'a V,
        service: &'a S,
        state: &'a StateStore,
    ) -> Self {
        Self {
            category,
            dataset,
            vcs,
            service,
            state,
        }
    }

    /// Run the category once.
    ///
    /// # Errors
    ///
    /// Setup failures (checkout, history, listing) and an unrecoverable
    /// conversion service abort the run. Per-file failures never do; they
    /// are counted in the report and left as failure markers.
    pub fn run(&self, options: RunOptions) -> Result<RunReport, RunError> {
        let span = info_span!("run", category = %self.category);
        let _guard = span.enter();
        let started = Instant::now();

        self.vcs.validate_checkout()?;
        let revision = self.vcs.current_revision()?;
        let previous = self
            .state
            .load(self.category)
            .map(|state| state.last_processed_revision);
        info!(
            revision = %revision,
            previous = previous.as_deref().unwrap_or("none"),
            "starting run"
        );

        let listing = list_markup_files(&self.dataset.source_root)?;
        let mut report = RunReport::new(self.category, previous.clone(), revision.clone());

        let changed = match previous.as_deref() {
            Some(previous) if previous == revision => {
                info!("revision unchanged, skipping change detection");
                Vec::new()
            }
            previous => {
                let resolution =
                    resolve_changes(self.vcs, self.dataset, &listing, previous, &revision)?;
                info!(
                    added = resolution.stats.added,
                    modified = resolution.stats.modified,
                    deleted = resolution.stats.deleted,
                    "resolved changed files"
                );
                for path in &resolution.deleted {
                    info!(path = %path.display(), "source deleted, outputs left in place");
                }
                report.changes = Some(resolution.stats);
                resolution.work_set
            }
        };

        let gaps = scan_output_gaps(&listing, self.dataset, options.retry_failures, Path::exists)?;
        info!(
            scanned = gaps.stats.scanned,
            outputs_present = gaps.stats.outputs_present,
            skipped_failures = gaps.stats.skipped_failures,
            selected = gaps.stats.selected,
            retry_failures = options.retry_failures,
            "scanned for missing outputs"
        );
        report.gaps = gaps.stats;
        report.work_set = merge_work_sets(&changed, &gaps.selected);
        info!(files = report.work_set.len(), "work set resolved");

        if options.dry_run {
            report.dry_run = true;
            report.elapsed = started.elapsed();
            return Ok(report);
        }

        if !report.work_set.is_empty() {
            self.service.ensure_healthy()?;
        }

        let pipeline = ConversionPipeline::new(self.service, self.dataset);
        let total = report.work_set.len();
        for (index, path) in report.work_set.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, total, path.display());
            let task = match FileTask::new(path, self.dataset) {
                Ok(task) => task,
                Err(error) => {
                    warn!(path = %path.display(), %error, "cannot derive output paths");
                    report.failed += 1;
                    continue;
                }
            };
            match pipeline.process(&task)? {
                ConversionOutcome::Success => report.succeeded += 1,
                ConversionOutcome::SkippedNoFragment => report.skipped_no_fragment += 1,
                ConversionOutcome::Failed { .. } => report.failed += 1,
            }
        }

        report.state = Some(self.state.save(self.category, &revision));
        report.elapsed = started.elapsed();
        info!(
            succeeded = report.succeeded,
            skipped = report.skipped_no_fragment,
            failed = report.failed,
            duration_ms = report.elapsed.as_millis(),
            "run complete"
        );
        Ok(report)
    }
}
