//! Run configuration: corpus location, conversion service settings and the
//! per-category dataset table.
//!
//! Configuration is read from TOML. Without a config file the built-in
//! defaults cover the `edition` and `translation` categories of the corpus.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::selector::{AttributeTest, Selector};

/// Immutable settings for one dataset category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Directory holding the source `.xml` files (inside the corpus checkout).
    pub source_root: PathBuf,
    /// Directory receiving the mirrored outputs.
    pub output_root: PathBuf,
    /// Selects the convertible fragment inside each document.
    pub selector: Selector,
    /// Grammar identifier passed to the conversion service as `type`.
    pub grammar: String,
}

/// Conversion service connection and recovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Endpoint receiving conversion POST requests.
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Command (program followed by arguments) that restarts the service.
    pub restart_command: Vec<String>,
    /// Maximum number of health polls after a restart.
    pub health_attempts: u32,
    /// Seconds between health polls.
    pub health_interval_secs: u64,
    /// Grammar used by the lightweight health probe.
    pub probe_grammar: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9999".to_string(),
            timeout_secs: 120,
            restart_command: vec![
                "docker".to_string(),
                "restart".to_string(),
                "xsugar".to_string(),
            ],
            health_attempts: 30,
            health_interval_secs: 2,
            probe_grammar: "epidoc".to_string(),
        }
    }
}

impl ServiceConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundtripConfig {
    /// Version-controlled checkout of the corpus.
    pub corpus_root: PathBuf,
    /// Directory holding one state file per category.
    pub state_dir: PathBuf,
    pub service: ServiceConfig,
    pub datasets: BTreeMap<String, DatasetConfig>,
}

impl Default for RoundtripConfig {
    fn default() -> Self {
        let mut datasets = BTreeMap::new();
        datasets.insert(
            "edition".to_string(),
            DatasetConfig {
                source_root: PathBuf::from("idp.data/DDB_EpiDoc_XML"),
                output_root: PathBuf::from("roundtrips/DDB_EpiDoc_XML"),
                selector: Selector::new(
                    "div",
                    Some(AttributeTest::Equals("type".into(), "edition".into())),
                ),
                grammar: "epidoc".to_string(),
            },
        );
        datasets.insert(
            "translation".to_string(),
            DatasetConfig {
                source_root: PathBuf::from("idp.data/HGV_trans_EpiDoc"),
                output_root: PathBuf::from("roundtrips/HGV_trans_EpiDoc"),
                selector: Selector::new("body", None),
                grammar: "translation_epidoc".to_string(),
            },
        );
        Self {
            corpus_root: PathBuf::from("idp.data"),
            state_dir: PathBuf::from("roundtrips/.state"),
            service: ServiceConfig::default(),
            datasets,
        }
    }
}

impl RoundtripConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing sections fall back to the built-in defaults; a `datasets`
    /// table, when present, replaces the built-in categories entirely.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| ModelError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Look up the dataset for `category`.
    pub fn dataset(&self, category: &str) -> Result<&DatasetConfig> {
        self.datasets
            .get(category)
            .ok_or_else(|| ModelError::UnknownCategory {
                category: category.to_string(),
                known: self.category_names().join(", "),
            })
    }

    pub fn category_names(&self) -> Vec<String> {
        self.datasets.keys().cloned().collect()
    }
}
