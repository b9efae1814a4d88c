//! JSON state files, one per category.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use roundtrip_model::ProcessingState;

use crate::error::{Result, StateError};

/// What [`StateStore::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new state record was written.
    Written,
    /// The stored revision already matched; nothing was written.
    Unchanged,
    /// Writing failed; the error was logged.
    Failed,
}

/// Persists the last processed revision of each category.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the state file for `category`.
    pub fn path_for(&self, category: &str) -> PathBuf {
        self.dir.join(format!("{category}.json"))
    }

    /// Read the stored state, distinguishing a missing file from a broken one.
    pub fn read(&self, category: &str) -> Result<Option<ProcessingState>> {
        let path = self.path_for(category);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StateError::Io {
                    operation: "read",
                    path,
                    source: e,
                });
            }
        };
        let state = serde_json::from_str(&content)
            .map_err(|source| StateError::Parse { path, source })?;
        Ok(Some(state))
    }

    /// Load the stored state for `category`.
    ///
    /// Any read or parse failure is logged and treated as "no prior state",
    /// which makes the next run a full run.
    pub fn load(&self, category: &str) -> Option<ProcessingState> {
        match self.read(category) {
            Ok(Some(state)) => {
                debug!(
                    category,
                    revision = %state.last_processed_revision,
                    timestamp = %state.timestamp,
                    "loaded processing state"
                );
                Some(state)
            }
            Ok(None) => {
                debug!(category, "no processing state recorded");
                None
            }
            Err(error) => {
                warn!(category, %error, "ignoring unreadable processing state");
                None
            }
        }
    }

    /// Record `revision` as processed for `category`.
    ///
    /// No-op when the stored revision is already `revision`. Write failures
    /// are logged and reported as [`SaveOutcome::Failed`] rather than raised.
    pub fn save(&self, category: &str, revision: &str) -> SaveOutcome {
        if let Some(current) = self.load(category)
            && current.last_processed_revision == revision
        {
            debug!(category, revision, "processing state unchanged");
            return SaveOutcome::Unchanged;
        }

        match self.write(category, &ProcessingState::new(revision)) {
            Ok(()) => {
                info!(category, revision, "saved processing state");
                SaveOutcome::Written
            }
            Err(error) => {
                warn!(category, revision, %error, "failed to save processing state");
                SaveOutcome::Failed
            }
        }
    }

    /// Write `state` atomically (temp file + rename).
    pub fn write(&self, category: &str, state: &ProcessingState) -> Result<()> {
        let path = self.path_for(category);
        let temp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(state).map_err(StateError::Serialize)?;

        fs::create_dir_all(&self.dir).map_err(|e| StateError::Io {
            operation: "create directory for",
            path: path.clone(),
            source: e,
        })?;

        let mut file = File::create(&temp_path).map_err(|e| StateError::Io {
            operation: "create",
            path: temp_path.clone(),
            source: e,
        })?;
        file.write_all(&bytes).map_err(|e| StateError::Io {
            operation: "write",
            path: temp_path.clone(),
            source: e,
        })?;
        file.sync_all().map_err(|e| StateError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, &path).map_err(|e| StateError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.clone(),
            source: e,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_state_loads_as_none() {
        let dir = tempdir().unwrap();
        let store = StateStore::new(dir.path());
        assert!(store.load("edition").is_none());
        assert!(store.read("edition").unwrap().is_none());
    }

    #[test]
    fn corrupt_state_loads_as_none() {
        let dir = tempdir().unwrap();
        let store = StateStore::new(dir.path());
        fs::write(store.path_for("edition"), "{ not json").unwrap();
        assert!(store.load("edition").is_none());
        assert!(matches!(
            store.read("edition").unwrap_err(),
            StateError::Parse { .. }
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let store = StateStore::new(dir.path().join("nested"));
        assert_eq!(store.save("edition", "abc123"), SaveOutcome::Written);
        let state = store.load("edition").unwrap();
        assert_eq!(state.last_processed_revision, "abc123");
        assert!(!store.path_for("edition").with_extension("json.tmp").exists());
    }

    #[test]
    fn save_is_noop_for_same_revision() {
        let dir = tempdir().unwrap();
        let store = StateStore::new(dir.path());
        store.save("edition", "abc123");
        let first = store.load("edition").unwrap();
        assert_eq!(store.save("edition", "abc123"), SaveOutcome::Unchanged);
        assert_eq!(store.load("edition").unwrap().timestamp, first.timestamp);
    }

    #[test]
    fn categories_are_independent() {
        let dir = tempdir().unwrap();
        let store = StateStore::new(dir.path());
        store.save("edition", "abc");
        assert!(store.load("translation").is_none());
    }

    #[test]
    fn state_files_live_in_store_dir() {
        let store = StateStore::new("roundtrips/.state");
        assert_eq!(store.dir(), Path::new("roundtrips/.state"));
        assert_eq!(
            store.path_for("translation"),
            store.dir().join("translation.json")
        );
    }
}
