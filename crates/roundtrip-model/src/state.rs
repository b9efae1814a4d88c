use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted per-category progress marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingState {
    pub last_processed_revision: String,
    pub timestamp: DateTime<Utc>,
}

impl ProcessingState {
    #[must_use]
    pub fn new(revision: impl Into<String>) -> Self {
        Self {
            last_processed_revision: revision.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Counts from one change-set resolution pass. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStats {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
}

/// Counts from one output-gap scan. Every scanned file lands in exactly one
/// bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapStats {
    pub scanned: usize,
    pub outputs_present: usize,
    pub skipped_failures: usize,
    pub selected: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_uses_camel_case_keys() {
        let state = ProcessingState::new("abc123");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["lastProcessedRevision"], "abc123");
        assert!(json["timestamp"].is_string());
    }
}
