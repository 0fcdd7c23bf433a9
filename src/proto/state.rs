//! The state byte-space shared by jobs, chains, and requests
//!
//! States are persisted as single bytes in the `requests` table and as
//! SCREAMING_SNAKE_CASE names everywhere JSON is spoken.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State of a job, a chain, or a request.
///
/// One byte-space covers all three: the Request Manager stores these
/// values in `requests.state`, job chains carry them per job, and the
/// chain itself has one at the top level. `RESERVED` and `SUSPENDED`
/// are request-level states and never appear on a job mid-traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum State {
    /// Job ran but its terminal state never came back
    #[default]
    Unknown = 0,
    /// Not started yet
    Pending = 1,
    /// Currently executing
    Running = 2,
    /// Finished successfully
    Complete = 3,
    /// Finished unsuccessfully
    Fail = 4,
    /// Request accepted but chain not yet started
    Reserved = 5,
    /// Stopped by operator action
    Stopped = 6,
    /// Suspended; resumable from a stored snapshot
    Suspended = 7,
}

impl State {
    /// Every state, in byte order.
    pub const ALL: [State; 8] = [
        State::Unknown,
        State::Pending,
        State::Running,
        State::Complete,
        State::Fail,
        State::Reserved,
        State::Stopped,
        State::Suspended,
    ];

    /// Canonical name for this state.
    pub fn name(self) -> &'static str {
        match self {
            State::Unknown => "UNKNOWN",
            State::Pending => "PENDING",
            State::Running => "RUNNING",
            State::Complete => "COMPLETE",
            State::Fail => "FAIL",
            State::Reserved => "RESERVED",
            State::Stopped => "STOPPED",
            State::Suspended => "SUSPENDED",
        }
    }

    /// The byte value stored in `requests.state`.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Resolve a stored byte back to a state.
    pub fn from_byte(b: u8) -> Option<State> {
        State::ALL.iter().copied().find(|s| s.as_byte() == b)
    }

    /// Comma-joined list of every valid state name, for error messages.
    pub fn valid_names() -> String {
        let names: Vec<&str> = State::ALL.iter().map(|s| s.name()).collect();
        names.join(", ")
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error resolving a state name.
#[derive(Debug, Error)]
#[error("Invalid state '{0}', expected one of: {valid}", valid = State::valid_names())]
pub struct InvalidState(pub String);

impl std::str::FromStr for State {
    type Err = InvalidState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        State::ALL
            .iter()
            .copied()
            .find(|state| state.name() == s)
            .ok_or_else(|| InvalidState(s.to_string()))
    }
}
