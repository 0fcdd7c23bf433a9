//! Requests and request filters
//!
//! A `Request` is one row of the RM's `requests` table as the API
//! returns it; `RequestFilter` is the query the `spinc find` command
//! builds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::State;

/// A user-initiated request, as returned by the Request Manager API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Request id (20 hex characters)
    pub id: String,

    /// Request type, e.g. "stop-host"
    #[serde(rename = "type")]
    pub request_type: String,

    /// User who made the request
    #[serde(default)]
    pub user: String,

    /// Request state
    #[serde(default)]
    pub state: State,

    /// When the request was created
    pub created_at: DateTime<Utc>,

    /// When the chain started running, if it has
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the chain finished, if it has
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Total jobs in the chain
    #[serde(default)]
    pub total_jobs: u32,

    /// Jobs that have finished running
    #[serde(default)]
    pub finished_jobs: u32,

    /// URL of the Job Runner executing the chain, if any
    #[serde(default)]
    pub jr_url: String,
}

/// Filter for finding requests.
///
/// Zero values mean "no constraint", except `limit`: the CLI defaults
/// it to 10 before building the filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    /// Exact-match request type
    #[serde(default)]
    pub request_type: Option<String>,

    /// Include only requests in these states
    #[serde(default)]
    pub states: Vec<State>,

    /// Exact-match requesting user
    #[serde(default)]
    pub user: Option<String>,

    /// Only requests created or run after this time
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,

    /// Only requests created or run before this time
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,

    /// Maximum number of requests to return
    #[serde(default)]
    pub limit: u32,

    /// Number of requests to skip
    #[serde(default)]
    pub offset: u32,
}
