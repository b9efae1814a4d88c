//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "idp-roundtrips",
    version,
    about = "Round-trip corpus markup through the XSugar converter",
    long_about = "Convert each changed or unconverted document of a corpus category\n\
                  from markup to shorthand, back to markup, and to shorthand again.\n\n\
                  Only files changed since the last recorded revision, or missing\n\
                  their outputs, are processed. Failures leave a .txt.fail marker."
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Dataset category to process (e.g. edition, translation).
    #[arg(value_name = "CATEGORY")]
    pub category: String,

    /// Re-attempt files that only have a failure marker.
    #[arg(long = "retry-failures")]
    pub retry_failures: bool,

    /// Resolve and print the work set without converting or saving state.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// TOML configuration file (defaults to the built-in corpus layout).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Conversion service endpoint, overriding the configuration.
    #[arg(long = "service-url", value_name = "URL")]
    pub service_url: Option<String>,

    /// Directory holding per-category state files, overriding the configuration.
    #[arg(long = "state-dir", value_name = "DIR")]
    pub state_dir: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
