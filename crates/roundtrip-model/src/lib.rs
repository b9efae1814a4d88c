//! Data model shared by the round-trip crates.

pub mod config;
pub mod error;
pub mod outcome;
pub mod selector;
pub mod state;
pub mod task;

pub use config::{DatasetConfig, RoundtripConfig, ServiceConfig};
pub use error::{ModelError, Result};
pub use outcome::{ConversionOutcome, Direction, Stage};
pub use selector::{AttributeTest, Selector};
pub use state::{ChangeStats, GapStats, ProcessingState};
pub use task::{
    FAILURE_EXTENSION, FileTask, INTERMEDIATE_EXTENSION, MARKUP_EXTENSION, PRIMARY_EXTENSION,
    is_markup_file,
};
