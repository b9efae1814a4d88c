//! The per-file round trip.
//!
//! Stages run strictly in order: extract the fragment, strip the namespace
//! declaration, convert to shorthand, convert back to markup (written as the
//! intermediate output) and convert that markup to shorthand again (written
//! as the primary output). The primary output can be compared with the
//! corpus' own shorthand to spot lossy conversions.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use roundtrip_ingest::{read_fragment, strip_namespace_declaration};
use roundtrip_model::{ConversionOutcome, DatasetConfig, Direction, FileTask, Stage};
use roundtrip_service::ConversionService;

use crate::error::{RunError, StageError, StageFailure};

/// Runs one [`FileTask`] at a time against a conversion service.
pub struct ConversionPipeline<'a, S: ?Sized> {
    service: &'a S,
    dataset: &'a DatasetConfig,
}

impl<'a, S: ConversionService + ?Sized> ConversionPipeline<'a, S> {
    pub fn new(service: &'a S, dataset: &'a DatasetConfig) -> Self {
        Self { service, dataset }
    }

    /// Process one file and record the result on disk.
    ///
    /// Stage failures remove any earlier outputs and leave a failure marker
    /// and a [`ConversionOutcome::Failed`]. A service fault additionally waits for
    /// the service to recover; only a failed recovery is returned as an error.
    pub fn process(&self, task: &FileTask) -> Result<ConversionOutcome, RunError> {
        let span = info_span!("file", path = %task.input_path.display());
        let _guard = span.enter();
        let started = Instant::now();

        match self.run_stages(task) {
            Ok(true) => {
                remove_file(&task.failure_marker_path);
                debug!(
                    duration_ms = started.elapsed().as_millis(),
                    "round trip complete"
                );
                Ok(ConversionOutcome::Success)
            }
            Ok(false) => {
                remove_stale(task, true);
                info!(selector = %self.dataset.selector, "no matching fragment, skipped");
                Ok(ConversionOutcome::SkippedNoFragment)
            }
            Err(failure) => {
                warn!(stage = %failure.stage, error = %failure.error, "stage failed");
                let outcome = ConversionOutcome::Failed {
                    stage: failure.stage,
                    message: failure.error.to_string(),
                };
                remove_stale(task, false);
                if let Some(text) = outcome.marker_text() {
                    write_marker(&task.failure_marker_path, &text);
                }
                if failure.error.is_service_fault() {
                    self.service.ensure_healthy()?;
                }
                Ok(outcome)
            }
        }
    }

    /// Returns `Ok(false)` when the document has no matching fragment.
    fn run_stages(&self, task: &FileTask) -> Result<bool, StageFailure> {
        let Some(fragment) = read_fragment(&task.input_path, &self.dataset.selector)
            .map_err(|e| StageFailure::new(Stage::Extract, e))?
        else {
            return Ok(false);
        };
        let normalized = strip_namespace_declaration(&fragment);

        let shorthand = self.convert(Stage::ToShorthand, &normalized, Direction::XmlToNonXml)?;
        let markup = self.convert(Stage::ToMarkup, &shorthand, Direction::NonXmlToXml)?;
        write_output(&task.intermediate_output_path, &markup)
            .map_err(|e| StageFailure::new(Stage::ToMarkup, e))?;

        let roundtrip = self.convert(Stage::RoundTrip, &markup, Direction::XmlToNonXml)?;
        write_output(&task.primary_output_path, &roundtrip)
            .map_err(|e| StageFailure::new(Stage::RoundTrip, e))?;
        Ok(true)
    }

    fn convert(
        &self,
        stage: Stage,
        content: &str,
        direction: Direction,
    ) -> Result<String, StageFailure> {
        debug!(%stage, %direction, bytes = content.len(), "converting");
        self.service
            .convert(content, direction, &self.dataset.grammar)
            .map_err(|e| StageFailure::new(stage, e))
    }
}

fn write_output(path: &Path, content: &str) -> Result<(), StageError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    };
    write().map_err(|source| StageError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_marker(path: &Path, text: &str) {
    if let Err(error) = write_output(path, text) {
        warn!(marker = %path.display(), %error, "failed to write failure marker");
    }
}

/// Remove outputs left by an earlier revision so they cannot pass for the
/// result of the current source. The marker goes too when `with_marker`.
fn remove_stale(task: &FileTask, with_marker: bool) {
    for output in task.outputs() {
        remove_file(output);
    }
    if with_marker {
        remove_file(&task.failure_marker_path);
    }
}

fn remove_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed stale file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(error) => warn!(path = %path.display(), %error, "failed to remove stale file"),
    }
}
