//! Chain traversal scenarios
//!
//! End-to-end checks of the completion oracle and runnability predicate
//! over small DAGs, covering the interplay of stopped jobs, failed
//! sequences, and independent branches.

use std::collections::HashMap;

use spincycle::{Chain, Job, JobChain, State};

fn job(id: &str, state: State, sequence_id: &str, sequence_retry: u32) -> Job {
    Job {
        id: id.to_string(),
        job_type: "test".to_string(),
        state,
        data: serde_json::Map::new(),
        retry: 0,
        sequence_id: sequence_id.to_string(),
        sequence_retry,
    }
}

fn jobs(list: Vec<Job>) -> HashMap<String, Job> {
    list.into_iter().map(|j| (j.id.clone(), j)).collect()
}

fn adjacency(edges: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
    edges
        .iter()
        .map(|(from, to)| {
            (
                from.to_string(),
                to.iter().map(|id| id.to_string()).collect(),
            )
        })
        .collect()
}

fn fresh_chain(jc: JobChain) -> Chain {
    Chain::new(jc, HashMap::new(), HashMap::new(), HashMap::new())
}

// =============================================================================
// Single-job chains
// =============================================================================

#[test]
fn test_single_running_job_keeps_chain_not_done() {
    let c = fresh_chain(JobChain {
        jobs: jobs(vec![job("job1", State::Running, "job1", 0)]),
        ..Default::default()
    });
    assert_eq!(c.is_done_running(), (false, false));
}

#[test]
fn test_single_complete_job_completes_chain() {
    let c = fresh_chain(JobChain {
        jobs: jobs(vec![job("job1", State::Complete, "job1", 0)]),
        ..Default::default()
    });
    assert_eq!(c.is_done_running(), (true, true));
}

// =============================================================================
// Stopped jobs and independent branches: 1 -> {2, 3}, 2 -> 4
// =============================================================================

fn diamond(states: [State; 4]) -> Chain {
    let [s1, s2, s3, s4] = states;
    fresh_chain(JobChain {
        jobs: jobs(vec![
            job("job1", s1, "job1", 0),
            job("job2", s2, "job1", 0),
            job("job3", s3, "job1", 0),
            job("job4", s4, "job1", 0),
        ]),
        adjacency_list: adjacency(&[("job1", &["job2", "job3"]), ("job2", &["job4"])]),
        ..Default::default()
    })
}

#[test]
fn test_stopped_job_on_side_branch_keeps_chain_running() {
    // job3 stopped, but job4's only predecessor (job2) is complete:
    // the independent sequence still has work.
    let c = diamond([
        State::Complete,
        State::Complete,
        State::Stopped,
        State::Pending,
    ]);
    assert!(c.is_runnable("job4"));
    assert_eq!(c.is_done_running(), (false, false));
}

#[test]
fn test_stopped_job_blocks_downstream_and_finishes_chain() {
    // job2 stopped blocks job4; nothing is runnable, so the chain is
    // done but not complete.
    let c = diamond([
        State::Complete,
        State::Stopped,
        State::Complete,
        State::Pending,
    ]);
    assert!(!c.is_runnable("job4"));
    assert_eq!(c.is_done_running(), (true, false));
}

#[test]
fn test_all_complete() {
    let c = diamond([State::Complete; 4]);
    assert_eq!(c.is_done_running(), (true, true));
}

// =============================================================================
// Failed jobs and sequence retries: job1 -> job2, budget of 2
// =============================================================================

fn failed_sequence(sequence_tries: u32) -> Chain {
    let jc = JobChain {
        jobs: jobs(vec![
            job("job1", State::Complete, "job1", 2),
            job("job2", State::Fail, "job1", 0),
        ]),
        adjacency_list: adjacency(&[("job1", &["job2"])]),
        ..Default::default()
    };
    Chain::new(
        jc,
        HashMap::from([("job1".to_string(), sequence_tries)]),
        HashMap::new(),
        HashMap::new(),
    )
}

#[test]
fn test_failed_job_with_retryable_sequence_keeps_chain_running() {
    let c = failed_sequence(1);
    assert!(c.can_retry_sequence("job2"));
    assert_eq!(c.is_done_running(), (false, false));
}

#[test]
fn test_failed_job_with_exhausted_sequence_finishes_chain() {
    let c = failed_sequence(3);
    assert!(!c.can_retry_sequence("job2"));
    assert_eq!(c.is_done_running(), (true, false));
}

// =============================================================================
// Invariants
// =============================================================================

#[test]
fn test_runnable_implies_pending_with_complete_predecessors() {
    let c = diamond([
        State::Complete,
        State::Running,
        State::Pending,
        State::Pending,
    ]);
    for id in ["job1", "job2", "job3", "job4"] {
        if c.is_runnable(id) {
            assert_eq!(c.job_state(id), State::Pending);
        }
    }
    // job3's predecessor is complete, job4's is running
    assert!(c.is_runnable("job3"));
    assert!(!c.is_runnable("job4"));
}

#[test]
fn test_job_try_counter_algebra() {
    let c = fresh_chain(JobChain {
        jobs: jobs(vec![job("job1", State::Pending, "job1", 0)]),
        ..Default::default()
    });

    c.increment_job_tries("job1", 3);
    assert_eq!(c.job_tries("job1"), (3, 3));

    // Negative delta only touches the latest-run counter.
    c.increment_job_tries("job1", -3);
    assert_eq!(c.job_tries("job1"), (0, 3));

    // Latest-run never exceeds total, before or after a rollback.
    c.increment_job_tries("job1", 2);
    let (latest, total) = c.job_tries("job1");
    assert!(latest <= total);
}

#[test]
fn test_can_retry_sequence_is_monotone_in_tries() {
    let c = fresh_chain(JobChain {
        jobs: jobs(vec![
            job("job1", State::Complete, "job1", 2),
            job("job2", State::Fail, "job1", 0),
        ]),
        adjacency_list: adjacency(&[("job1", &["job2"])]),
        ..Default::default()
    });

    let mut last = c.can_retry_sequence("job2");
    for _ in 0..5 {
        c.increment_sequence_tries("job2", 1);
        let now = c.can_retry_sequence("job2");
        assert!(!(now && !last), "can_retry_sequence flipped back to true");
        last = now;
    }
    assert!(!last);
}
