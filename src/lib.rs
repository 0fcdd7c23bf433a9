//! Spin Cycle - distributed job orchestration
//!
//! This crate implements the chain traversal core shared by the Request
//! Manager and the Job Runner fleet: the in-memory job chain state
//! machine, its runnability and completion logic, per-job and
//! per-sequence retry bookkeeping, and the suspend/resume snapshot.
//! It also ships the `spinc` CLI and the RM client it talks through.

pub mod chain;
pub mod client;
pub mod proto;
pub mod spinc;

pub use chain::Chain;
pub use client::{ClientError, HttpRmClient, MockRmClient, RmClient};
pub use proto::{
    Job, JobChain, Request, RequestFilter, State, SuspendError, SuspendedJobChain,
};
pub use spinc::{squeeze, CommandError, Find, FindError, SpincConfig};
