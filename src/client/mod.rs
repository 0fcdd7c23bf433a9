//! Request Manager client
//!
//! The `spinc` CLI talks to the Request Manager through the [`RmClient`]
//! trait. [`HttpRmClient`] is the real implementation; [`MockRmClient`]
//! serves command tests.

mod mock;

pub use mock::MockRmClient;

use std::time::Duration;

use thiserror::Error;

use crate::proto::{Request, RequestFilter};

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the Request Manager.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The RM returned an error status code
    #[error("RM error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the RM
        message: String,
    },
}

impl ClientError {
    /// Create an API error from status code and message.
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}

/// Client interface to the Request Manager API.
pub trait RmClient {
    /// Find requests matching the filter, newest first.
    fn find_requests(&self, filter: &RequestFilter) -> Result<Vec<Request>>;
}

/// Blocking HTTP client for the Request Manager API.
#[derive(Debug, Clone)]
pub struct HttpRmClient {
    /// Base URL of the RM, e.g. "http://127.0.0.1:32308"
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpRmClient {
    /// Create a client for the RM at `base_url` with a request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// The RM base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn query_params(filter: &RequestFilter) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(request_type) = &filter.request_type {
            params.push(("type", request_type.clone()));
        }
        if !filter.states.is_empty() {
            let names: Vec<&str> = filter.states.iter().map(|s| s.name()).collect();
            params.push(("states", names.join(",")));
        }
        if let Some(user) = &filter.user {
            params.push(("user", user.clone()));
        }
        if let Some(since) = &filter.since {
            params.push(("since", since.to_rfc3339()));
        }
        if let Some(until) = &filter.until {
            params.push(("until", until.to_rfc3339()));
        }
        params.push(("limit", filter.limit.to_string()));
        params.push(("offset", filter.offset.to_string()));
        params
    }
}

impl RmClient for HttpRmClient {
    fn find_requests(&self, filter: &RequestFilter) -> Result<Vec<Request>> {
        let url = format!("{}/api/v1/requests", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&Self::query_params(filter))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), message));
        }

        Ok(response.json()?)
    }
}
