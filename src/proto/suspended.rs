//! Suspended job chain snapshot
//!
//! When a chain is suspended mid-traversal, the runner snapshots the
//! chain plus all try counters into a `SuspendedJobChain`. The RM
//! persists the blob in `suspended_job_chains`; resuming means handing
//! the snapshot's parts back to `Chain::new`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::JobChain;

/// Everything needed to reconstruct a Chain and resume traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendedJobChain {
    /// Request id, duplicated from the chain for keyed storage
    pub request_id: String,

    /// The chain as it stood at suspension
    pub job_chain: JobChain,

    /// Total tries per job, across all sequence tries
    #[serde(default)]
    pub total_job_tries: HashMap<String, u32>,

    /// Tries per job within the latest sequence try
    #[serde(default)]
    pub latest_run_job_tries: HashMap<String, u32>,

    /// Tries per sequence, keyed by sequence-start job id
    #[serde(default)]
    pub sequence_tries: HashMap<String, u32>,
}

/// Errors for suspended chain snapshot operations.
#[derive(Debug, Error)]
pub enum SuspendError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SuspendedJobChain {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Load from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write atomically to file (write-then-rename).
    pub fn write_to_file(&self, path: &Path) -> Result<(), SuspendError> {
        let json = self.to_json()?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &json)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Load from file.
    pub fn from_file(path: &Path) -> Result<Self, SuspendError> {
        let json = fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{Job, State};

    fn snapshot() -> SuspendedJobChain {
        let mut jobs = HashMap::new();
        jobs.insert(
            "job1".to_string(),
            Job {
                id: "job1".to_string(),
                job_type: "noop".to_string(),
                state: State::Stopped,
                data: serde_json::Map::new(),
                retry: 1,
                sequence_id: "job1".to_string(),
                sequence_retry: 2,
            },
        );
        SuspendedJobChain {
            request_id: "req1".to_string(),
            job_chain: JobChain {
                request_id: "req1".to_string(),
                jobs,
                adjacency_list: HashMap::new(),
                state: State::Suspended,
                finished_jobs: 0,
            },
            total_job_tries: HashMap::from([("job1".to_string(), 2)]),
            latest_run_job_tries: HashMap::from([("job1".to_string(), 1)]),
            sequence_tries: HashMap::from([("job1".to_string(), 1)]),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let sjc = snapshot();
        let json = sjc.to_json().unwrap();
        assert!(json.contains("\"requestId\":\"req1\""));
        assert!(json.contains("\"sequenceTries\""));

        let parsed = SuspendedJobChain::from_json(&json).unwrap();
        assert_eq!(parsed, sjc);
    }

    #[test]
    fn test_file_round_trip() {
        let sjc = snapshot();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sjc.json");

        sjc.write_to_file(&path).unwrap();
        let loaded = SuspendedJobChain::from_file(&path).unwrap();
        assert_eq!(loaded, sjc);

        // No temp file left behind
        assert!(!path.with_extension("tmp").exists());
    }
}
