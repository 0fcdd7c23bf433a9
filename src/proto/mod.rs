//! Shared domain types for Spin Cycle
//!
//! The structures here are the contract between the Request Manager,
//! the Job Runner fleet, and the `spinc` CLI. Field names serialize in
//! camelCase; the persistence layer stores these blobs as-is in
//! `request_archives` and `suspended_job_chains`.

mod request;
mod state;
mod suspended;

pub use request::{Request, RequestFilter};
pub use state::{InvalidState, State};
pub use suspended::{SuspendError, SuspendedJobChain};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single job in a chain.
///
/// The job's business logic is opaque to the traversal core: the runner
/// resolves `job_type` to an implementation and hands it `data`. The
/// core only reads `id`, `state`, `sequence_id`, and the retry budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique within the chain
    pub id: String,

    /// Job type name, resolved by the runner
    #[serde(rename = "type", default)]
    pub job_type: String,

    /// Current state
    #[serde(default)]
    pub state: State,

    /// Opaque job data; the core never reads or mutates it
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,

    /// Per-job retry budget within one sequence try
    #[serde(default)]
    pub retry: u32,

    /// Id of the first job in this job's sequence. A job whose
    /// `sequence_id` equals its own `id` is a sequence-start job.
    #[serde(default)]
    pub sequence_id: String,

    /// Sequence retry budget; meaningful only on sequence-start jobs
    #[serde(default)]
    pub sequence_retry: u32,
}

/// An immutable DAG of jobs plus chain-level run metadata.
///
/// `adjacency_list` holds forward edges only; reverse lookups scan it.
/// The graph is trusted: the upstream request resolver guarantees
/// acyclicity and referential integrity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobChain {
    /// Id of the request this chain was synthesized from
    #[serde(default)]
    pub request_id: String,

    /// All jobs, keyed by job id
    #[serde(default)]
    pub jobs: HashMap<String, Job>,

    /// Forward edges: job id -> ids of the jobs that run after it
    #[serde(default)]
    pub adjacency_list: HashMap<String, Vec<String>>,

    /// Chain-level state
    #[serde(default)]
    pub state: State,

    /// Jobs that have finished running, maintained by the reaper
    #[serde(default)]
    pub finished_jobs: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_data_defaults_to_empty_map() {
        // A job deserialized without data still has a writable map.
        let job: Job = serde_json::from_str(
            r#"{"id": "job1", "sequenceId": "job1"}"#,
        )
        .unwrap();
        assert!(job.data.is_empty());
        assert_eq!(job.state, State::Unknown);
    }

    #[test]
    fn test_job_chain_serde_field_names() {
        let jc = JobChain {
            request_id: "abc123".to_string(),
            finished_jobs: 2,
            ..Default::default()
        };
        let json = serde_json::to_string(&jc).unwrap();
        assert!(json.contains("\"requestId\":\"abc123\""));
        assert!(json.contains("\"finishedJobs\":2"));
        assert!(json.contains("\"adjacencyList\""));
    }

    #[test]
    fn test_job_type_serializes_as_type() {
        let job = Job {
            id: "job1".to_string(),
            job_type: "shell-command".to_string(),
            state: State::Pending,
            data: serde_json::Map::new(),
            retry: 0,
            sequence_id: "job1".to_string(),
            sequence_retry: 0,
        };
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("\"type\":\"shell-command\""));
    }
}
