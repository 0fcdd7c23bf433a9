//! Job chain traversal core
//!
//! A [`Chain`] binds an immutable job DAG to the mutable state one
//! traversal needs: per-job states, per-job try counters, per-sequence
//! try counters, and the finished-jobs count. The traverser scans it
//! for runnable jobs, workers report terminal states into it, and the
//! reaper asks it whether the chain is done. The chain itself does no
//! dispatching and no I/O; it is pure bookkeeping behind two locks.
//!
//! Locking: `jobs` guards the job map plus chain-level state and the
//! finished counter; `tries` guards the three counter maps. Operations
//! that need both either release `jobs` before taking `tries`, or (in
//! the completion scan) take short `tries` read locks while holding the
//! `jobs` read guard. The order is always jobs then tries, never the
//! reverse. Helpers that require the `jobs` guard are free functions
//! over `&JobChain`, so they can only be called with the guard in hand.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::proto::{Job, JobChain, State, SuspendedJobChain};

/// The three try-counter maps, guarded together.
#[derive(Debug, Default)]
struct TryCounts {
    /// Tries per sequence, keyed by sequence-start job id
    sequence: HashMap<String, u32>,
    /// Tries per job within the latest sequence try; resets on rollback
    latest_run_job: HashMap<String, u32>,
    /// Total tries per job, monotonic across sequence retries
    total_job: HashMap<String, u32>,
}

/// A job chain plus the run-state of one traversal attempt.
///
/// Constructed fresh (empty counter maps) or from a suspended snapshot
/// (the snapshot's maps). Lives in memory for the duration of one
/// traversal; on suspension the caller extracts [`Chain::to_suspended`]
/// and discards the chain.
#[derive(Debug)]
pub struct Chain {
    jobs: RwLock<JobChain>,
    tries: RwLock<TryCounts>,
}

impl Chain {
    /// Create a chain from a job chain and try counts.
    ///
    /// The maps are empty for a fresh run and carry prior counts when
    /// resuming from a suspended snapshot. The chain takes ownership of
    /// all of it as backing state; the DAG is trusted and not validated
    /// here, and counters not present in the maps simply read as zero.
    pub fn new(
        job_chain: JobChain,
        sequence_tries: HashMap<String, u32>,
        total_job_tries: HashMap<String, u32>,
        latest_run_job_tries: HashMap<String, u32>,
    ) -> Chain {
        Chain {
            jobs: RwLock::new(job_chain),
            tries: RwLock::new(TryCounts {
                sequence: sequence_tries,
                latest_run_job: latest_run_job_tries,
                total_job: total_job_tries,
            }),
        }
    }

    /// All jobs adjacent to the given job, in arbitrary order.
    pub fn next_jobs(&self, job_id: &str) -> Vec<Job> {
        let jc = self.jobs.read().unwrap();
        let mut next = Vec::new();
        if let Some(next_ids) = jc.adjacency_list.get(job_id) {
            for id in next_ids {
                if let Some(job) = jc.jobs.get(id) {
                    next.push(job.clone());
                }
            }
        }
        next
    }

    /// True if the job is runnable: state PENDING and every immediately
    /// previous job COMPLETE. Stopped jobs are not runnable here; they
    /// become runnable again only when the chain is reconstructed from
    /// a suspended snapshot and re-run.
    pub fn is_runnable(&self, job_id: &str) -> bool {
        let jc = self.jobs.read().unwrap();
        is_runnable(&jc, job_id)
    }

    /// All runnable jobs, in arbitrary order, from one consistent
    /// snapshot of job states.
    pub fn runnable_jobs(&self) -> Vec<Job> {
        let jc = self.jobs.read().unwrap();
        jc.jobs
            .values()
            .filter(|job| is_runnable(&jc, &job.id))
            .cloned()
            .collect()
    }

    /// Whether the chain is done running, and whether it completed.
    ///
    /// `complete` is true iff every job finished in state COMPLETE.
    ///
    /// `done` is true when there are no running jobs, no runnable jobs,
    /// and no failed job whose sequence can still be retried. Reapers
    /// roll back failed jobs when the sequence has retries left, so a
    /// failed job does not by itself end the chain, and a stopped job
    /// does not either: independent sequences keep running. For chain
    /// A -> B -> C, if B stops, C is not runnable and the chain is
    /// done; add D off A and a pending D keeps the chain not-done.
    ///
    /// Panics on a job state that cannot occur mid-traversal; that is
    /// an invariant breach upstream, not a policy decision.
    pub fn is_done_running(&self) -> (bool, bool) {
        let jc = self.jobs.read().unwrap();
        let mut complete = true;
        for job in jc.jobs.values() {
            match job.state {
                State::Complete => continue,
                State::Running => {
                    // Still running, so neither done nor complete.
                    return (false, false);
                }
                State::Stopped => {
                    // Not runnable in this chain run, but other
                    // sequences may still have work. Keep scanning.
                }
                State::Pending => {
                    if is_runnable(&jc, &job.id) {
                        return (false, false);
                    }
                    // Pending but not runnable: a previous job failed.
                }
                State::Fail | State::Unknown => {
                    if self.can_retry_sequence_locked(&jc, &job.id) {
                        return (false, false);
                    }
                    // Failed with no sequence retries left.
                }
                other => panic!("is_done_running: invalid job state: {}", other),
            }

            // Only reachable for a job that is pending-not-runnable,
            // stopped, or failed beyond retry. The chain is not
            // complete, but it may still be done.
            complete = false;
        }
        (true, complete)
    }

    /// Number of jobs in state FAIL or UNKNOWN. Reapers use this to
    /// decide whether a finished chain failed or can be finalized as
    /// stopped or suspended.
    pub fn failed_jobs(&self) -> u32 {
        let jc = self.jobs.read().unwrap();
        jc.jobs
            .values()
            .filter(|job| job.state == State::Fail || job.state == State::Unknown)
            .count() as u32
    }

    /// The first job of the sequence the given job belongs to.
    pub fn sequence_start_job(&self, job_id: &str) -> Option<Job> {
        let jc = self.jobs.read().unwrap();
        sequence_start_job(&jc, job_id).cloned()
    }

    /// True if the job starts its own sequence.
    pub fn is_sequence_start_job(&self, job_id: &str) -> bool {
        let jc = self.jobs.read().unwrap();
        match jc.jobs.get(job_id) {
            Some(job) => job.id == job.sequence_id,
            None => false,
        }
    }

    /// Whether the sequence containing the given job has tries left.
    ///
    /// The comparison is `tries <= budget` because the current attempt
    /// counts: a sequence retry budget of 2 allows three attempts.
    /// Unknown job ids are not retryable.
    pub fn can_retry_sequence(&self, job_id: &str) -> bool {
        let start = match self.sequence_start_job(job_id) {
            Some(job) => job,
            None => return false,
        };
        let tries = self.tries.read().unwrap();
        tries.sequence.get(&start.id).copied().unwrap_or(0) <= start.sequence_retry
    }

    /// Adjust a job's try counters by a signed delta.
    ///
    /// A positive delta grows both counters; a negative delta only
    /// lowers the latest-run counter (total tries are monotonic across
    /// sequence retries, latest-run tries reset on rollback). Driving
    /// the latest-run counter below zero is a caller bug.
    pub fn increment_job_tries(&self, job_id: &str, delta: i32) {
        let mut tries = self.tries.write().unwrap();
        if delta > 0 {
            *tries.total_job.entry(job_id.to_string()).or_insert(0) += delta as u32;
        }
        let cur = tries.latest_run_job.get(job_id).copied().unwrap_or(0) as i64;
        let next = cur + i64::from(delta);
        if next < 0 {
            panic!(
                "increment_job_tries job id {}: cur {} + delta {} < 0",
                job_id, cur, delta
            );
        }
        tries.latest_run_job.insert(job_id.to_string(), next as u32);
    }

    /// Try counts for a job: (latest run, total).
    pub fn job_tries(&self, job_id: &str) -> (u32, u32) {
        let tries = self.tries.read().unwrap();
        let latest = tries.latest_run_job.get(job_id).copied().unwrap_or(0);
        let total = tries.total_job.get(job_id).copied().unwrap_or(0);
        (latest, total)
    }

    /// Adjust the try count of the sequence containing the given job.
    ///
    /// Unknown job ids are a no-op: silently growing a counter for an
    /// id the chain has never seen would poison the suspend snapshot.
    /// Driving the counter below zero is a caller bug.
    pub fn increment_sequence_tries(&self, job_id: &str, delta: i32) {
        let seq_id = {
            let jc = self.jobs.read().unwrap();
            match jc.jobs.get(job_id) {
                Some(job) => job.sequence_id.clone(),
                None => return,
            }
        };
        let mut tries = self.tries.write().unwrap();
        let cur = tries.sequence.get(&seq_id).copied().unwrap_or(0) as i64;
        let next = cur + i64::from(delta);
        if next < 0 {
            panic!(
                "increment_sequence_tries job id {}: cur {} + delta {} < 0",
                job_id, cur, delta
            );
        }
        tries.sequence.insert(seq_id, next as u32);
    }

    /// Try count of the sequence containing the given job.
    pub fn sequence_tries(&self, job_id: &str) -> u32 {
        let seq_id = {
            let jc = self.jobs.read().unwrap();
            match jc.jobs.get(job_id) {
                Some(job) => job.sequence_id.clone(),
                None => return 0,
            }
        };
        let tries = self.tries.read().unwrap();
        tries.sequence.get(&seq_id).copied().unwrap_or(0)
    }

    /// Adjust the finished-jobs count by a signed delta. Negative delta
    /// is given on sequence retry; going below zero is a caller bug.
    pub fn increment_finished_jobs(&self, delta: i32) {
        let mut jc = self.jobs.write().unwrap();
        let cur = i64::from(jc.finished_jobs);
        let next = cur + i64::from(delta);
        if next < 0 {
            panic!("increment_finished_jobs: cur {} + delta {} < 0", cur, delta);
        }
        jc.finished_jobs = next as u32;
    }

    /// Jobs that have finished running.
    pub fn finished_jobs(&self) -> u32 {
        let jc = self.jobs.read().unwrap();
        jc.finished_jobs
    }

    /// Snapshot the chain and all try counters for durable suspension.
    /// Resume by handing the snapshot's parts back to [`Chain::new`].
    pub fn to_suspended(&self) -> SuspendedJobChain {
        let job_chain = self.jobs.read().unwrap().clone();
        let tries = self.tries.read().unwrap();
        SuspendedJobChain {
            request_id: job_chain.request_id.clone(),
            job_chain,
            total_job_tries: tries.total_job.clone(),
            latest_run_job_tries: tries.latest_run_job.clone(),
            sequence_tries: tries.sequence.clone(),
        }
    }

    /// The request id of the job chain.
    pub fn request_id(&self) -> String {
        let jc = self.jobs.read().unwrap();
        jc.request_id.clone()
    }

    /// State of a job. Unknown ids read as UNKNOWN.
    pub fn job_state(&self, job_id: &str) -> State {
        let jc = self.jobs.read().unwrap();
        jc.jobs.get(job_id).map(|job| job.state).unwrap_or_default()
    }

    /// Set a job's state. Unconditional: the single-job state machine
    /// is enforced by the caller, not here.
    pub fn set_job_state(&self, job_id: &str, state: State) {
        let mut jc = self.jobs.write().unwrap();
        if let Some(job) = jc.jobs.get_mut(job_id) {
            job.state = state;
        }
    }

    /// The chain-level state.
    pub fn state(&self) -> State {
        let jc = self.jobs.read().unwrap();
        jc.state
    }

    /// Set the chain-level state.
    pub fn set_state(&self, state: State) {
        let mut jc = self.jobs.write().unwrap();
        jc.state = state;
    }

    // Like can_retry_sequence, for callers already holding the jobs
    // read guard. Takes tries after jobs, never the other way around.
    fn can_retry_sequence_locked(&self, jc: &JobChain, job_id: &str) -> bool {
        let start = match sequence_start_job(jc, job_id) {
            Some(job) => job,
            None => return false,
        };
        let tries = self.tries.read().unwrap();
        tries.sequence.get(&start.id).copied().unwrap_or(0) <= start.sequence_retry
    }
}

// -------------------------------------------------------------------------- //
// Helpers over a held jobs guard. Taking &JobChain instead of &self keeps
// them impossible to call without the lock.

fn is_runnable(jc: &JobChain, job_id: &str) -> bool {
    match jc.jobs.get(job_id) {
        Some(job) if job.state == State::Pending => previous_jobs(jc, job_id)
            .iter()
            .all(|prev| prev.state == State::Complete),
        _ => false,
    }
}

fn sequence_start_job<'a>(jc: &'a JobChain, job_id: &str) -> Option<&'a Job> {
    let job = jc.jobs.get(job_id)?;
    jc.jobs.get(&job.sequence_id)
}

// All immediately previous jobs of the given job. Linear scan over the
// forward adjacency list; chains are small and this runs far less often
// than state mutation.
fn previous_jobs<'a>(jc: &'a JobChain, job_id: &str) -> Vec<&'a Job> {
    let mut prev = Vec::new();
    for (cur_id, next_ids) in &jc.adjacency_list {
        if next_ids.iter().any(|id| id == job_id) {
            if let Some(job) = jc.jobs.get(cur_id) {
                prev.push(job);
            }
        }
    }
    prev
}
