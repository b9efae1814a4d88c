//! Incremental round-trip runs over a corpus category.

pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod reconcile;

pub use error::{RunError, StageError, StageFailure};
pub use orchestrator::{Orchestrator, RunOptions, RunReport};
pub use pipeline::ConversionPipeline;
pub use reconcile::{
    GapScan, Resolution, merge_work_sets, resolve_change_set, resolve_changes,
    resolve_full_listing, scan_output_gaps,
};
