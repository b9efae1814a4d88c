use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown category '{category}' (expected one of: {known})")]
    UnknownCategory { category: String, known: String },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("{path} is not under source root {root}")]
    OutsideSourceRoot { path: PathBuf, root: PathBuf },

    #[error("{path} is not an .xml file")]
    NotMarkup { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, ModelError>;
