//! `spinc find` - retrieve and filter requests
//!
//! Args are `filter=value` words. Recognized filters: `type`, `states`,
//! `user`, `since`, `until`, `limit`, `offset`, each at most once.
//! Matching requests print as a fixed-width table, one row per request.

use std::collections::HashMap;
use std::io::Write;

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

use crate::client::RmClient;
use crate::proto::{InvalidState, Request, RequestFilter, State};

use super::{squeeze, CommandError};

/// Limit to this many requests when no `limit` filter is given.
pub const FIND_LIMIT_DEFAULT: u32 = 10;

// Column widths for request output.
const ID_COL_LEN: usize = 20;
const REQ_COL_LEN: usize = 40;
const USER_COL_LEN: usize = 9;
const STATE_COL_LEN: usize = 9;
const JOBS_COL_LEN: usize = 15;

/// Expected time input format, as shown to users.
const TIME_FMT: &str = "YYYY-MM-DD HH:MM:SS UTC";
/// The same format as a chrono format string.
const TIME_FMT_STR: &str = "%Y-%m-%d %H:%M:%S UTC";
/// Where the literal `UTC` must sit in a time value.
const UTC_INDEX: usize = 20;

const TIME_COL_LEN: usize = TIME_FMT.len();

const VALID_FILTERS: [&str; 7] = ["type", "states", "user", "since", "until", "limit", "offset"];

/// Errors parsing `find` filters.
#[derive(Debug, Error)]
pub enum FindError {
    #[error("Invalid command arg: {0}: split on = produced 1 value, expected 2 (filter=value)")]
    MalformedArg(String),

    #[error("Invalid filter '{0}'")]
    UnknownFilter(String),

    #[error("Filter '{0}' specified multiple times")]
    DuplicateFilter(String),

    #[error(transparent)]
    InvalidState(#[from] InvalidState),

    #[error("Invalid time {value}, expected string 'UTC' at index {index}")]
    TimeUtcOffset { value: String, index: usize },

    #[error("Invalid time {value}, expected form '{format}'")]
    TimeFormat {
        value: String,
        format: &'static str,
    },

    #[error("Invalid limit '{0}', expected value >= 0")]
    InvalidLimit(String),

    #[error("Invalid offset '{0}', expected value >= 0")]
    InvalidOffset(String),
}

/// The `find` command.
#[derive(Debug)]
pub struct Find {
    filter: RequestFilter,
}

impl Find {
    /// Parse `filter=value` args into a request filter.
    pub fn prepare(args: &[String]) -> Result<Find, FindError> {
        let mut filters: HashMap<&str, &str> = HashMap::new();
        for arg in args {
            let (filter, value) = arg
                .split_once('=')
                .ok_or_else(|| FindError::MalformedArg(arg.clone()))?;
            if !VALID_FILTERS.contains(&filter) {
                return Err(FindError::UnknownFilter(filter.to_string()));
            }
            if filters.contains_key(filter) {
                return Err(FindError::DuplicateFilter(filter.to_string()));
            }
            filters.insert(filter, value);
            tracing::debug!(filter, value, "parsed filter");
        }

        let non_empty = |key: &str| filters.get(key).filter(|v| !v.is_empty());

        let mut states = Vec::new();
        if let Some(value) = non_empty("states") {
            for name in value.split(',') {
                states.push(name.parse::<State>()?);
            }
        }

        let since = non_empty("since").map(|v| parse_utc_time(v)).transpose()?;
        let until = non_empty("until").map(|v| parse_utc_time(v)).transpose()?;

        let limit = match non_empty("limit") {
            None => FIND_LIMIT_DEFAULT,
            Some(value) => value
                .parse::<u32>()
                .map_err(|_| FindError::InvalidLimit(value.to_string()))?,
        };
        let offset = match non_empty("offset") {
            None => 0,
            Some(value) => value
                .parse::<u32>()
                .map_err(|_| FindError::InvalidOffset(value.to_string()))?,
        };

        Ok(Find {
            filter: RequestFilter {
                request_type: non_empty("type").map(|v| v.to_string()),
                states,
                user: non_empty("user").map(|v| v.to_string()),
                since,
                until,
                limit,
                offset,
            },
        })
    }

    /// The filter this command will send to the RM.
    pub fn filter(&self) -> &RequestFilter {
        &self.filter
    }

    /// Fetch matching requests and print them to `out`. An empty result
    /// prints nothing, not even the header.
    pub fn run<W: Write>(&self, client: &dyn RmClient, out: &mut W) -> Result<(), CommandError> {
        let requests = client.find_requests(&self.filter)?;
        tracing::debug!(count = requests.len(), "find returned requests");

        if requests.is_empty() {
            return Ok(());
        }
        write_table(out, &requests)?;
        Ok(())
    }

    /// Usage text for the command.
    pub fn help() -> String {
        format!(
            "'spinc find [filter=value]' retrieves and filters requests.

Filters:
  type        type of request to return
  states      comma-separated list of request states to include
  user        return only requests made by this user
  since       return requests created or run after this time
  until       return requests created or run before this time
  limit       limit response to this many requests (default: {})
  offset      skip the first <offset> requests

Times should be formatted as '{}'. Time should be specified in UTC.
",
            FIND_LIMIT_DEFAULT, TIME_FMT
        )
    }
}

fn parse_utc_time(value: &str) -> Result<DateTime<Utc>, FindError> {
    if value.find("UTC") != Some(UTC_INDEX) {
        return Err(FindError::TimeUtcOffset {
            value: value.to_string(),
            index: UTC_INDEX,
        });
    }
    let naive = NaiveDateTime::parse_from_str(value, TIME_FMT_STR).map_err(|_| {
        FindError::TimeFormat {
            value: value.to_string(),
            format: TIME_FMT,
        }
    })?;
    Ok(naive.and_utc())
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(t) => t.format(TIME_FMT_STR).to_string(),
        None => "N/A".to_string(),
    }
}

fn write_table<W: Write>(out: &mut W, requests: &[Request]) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<id$} {:<req$} {:<user$} {:<state$} {:<time$} {:<time$} {:<time$} {:<jobs$} {}",
        "ID",
        "REQUEST",
        "USER",
        "STATE",
        "CREATED",
        "STARTED",
        "FINISHED",
        "JOBS",
        "HOST",
        id = ID_COL_LEN,
        req = REQ_COL_LEN,
        user = USER_COL_LEN,
        state = STATE_COL_LEN,
        time = TIME_COL_LEN,
        jobs = JOBS_COL_LEN,
    )?;

    for r in requests {
        let jobs = format!("{} / {}", r.finished_jobs, r.total_jobs);
        writeln!(
            out,
            "{:<id$} {:<req$} {:<user$} {:<state$} {:<time$} {:<time$} {:<time$} {:<jobs$} {}",
            squeeze(&r.id, ID_COL_LEN, ".."),
            squeeze(&r.request_type, REQ_COL_LEN, ".."),
            squeeze(&r.user, USER_COL_LEN, ".."),
            squeeze(r.state.name(), STATE_COL_LEN, ".."),
            format_time(Some(r.created_at)),
            format_time(r.started_at),
            format_time(r.finished_at),
            squeeze(&jobs, JOBS_COL_LEN, ".."),
            r.jr_url,
            id = ID_COL_LEN,
            req = REQ_COL_LEN,
            user = USER_COL_LEN,
            state = STATE_COL_LEN,
            time = TIME_COL_LEN,
            jobs = JOBS_COL_LEN,
        )?;
    }
    Ok(())
}
