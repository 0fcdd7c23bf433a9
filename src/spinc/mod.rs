//! spinc CLI command layer
//!
//! Commands parse their args up front (`prepare`), then execute against
//! an [`RmClient`](crate::client::RmClient) and write human output to
//! the given sink. The binary in `src/main.rs` wires in the real HTTP
//! client; tests wire in the mock.

mod config;
mod find;

pub use config::{ConfigError, SpincConfig};
pub use find::{Find, FindError, FIND_LIMIT_DEFAULT};

use std::io;

use thiserror::Error;

use crate::client::ClientError;

/// Errors from running a spinc command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Find(#[from] FindError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Squeeze a string to at most `max` characters by cutting the middle
/// and splicing in `ellipsis`; the head keeps the odd character.
pub fn squeeze(s: &str, max: usize, ellipsis: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max {
        return s.to_string();
    }
    let budget = max.saturating_sub(ellipsis.chars().count());
    let half = budget / 2;
    let head: String = chars[..half + budget % 2].iter().collect();
    let tail: String = chars[chars.len() - half..].iter().collect();
    format!("{}{}{}", head, ellipsis, tail)
}
