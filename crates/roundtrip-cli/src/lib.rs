//! CLI components for the corpus round-trip runner.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
