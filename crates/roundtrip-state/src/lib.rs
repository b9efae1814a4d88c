//! Persisted per-category run state.

pub mod error;
pub mod store;

pub use error::{Result, StateError};
pub use store::{SaveOutcome, StateStore};
