//! Mock RM client for command tests

use std::sync::Mutex;

use crate::proto::{Request, RequestFilter};

use super::{ClientError, Result, RmClient};

/// Configurable mock Request Manager client.
///
/// Returns canned requests and records the filters it was called with,
/// so command tests can assert on both sides of the seam.
#[derive(Debug, Default)]
pub struct MockRmClient {
    requests: Vec<Request>,
    error: Option<(u16, String)>,
    filters_seen: Mutex<Vec<RequestFilter>>,
}

impl MockRmClient {
    /// A mock that returns no requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that returns the given requests.
    pub fn with_requests(requests: Vec<Request>) -> Self {
        Self {
            requests,
            ..Self::default()
        }
    }

    /// Make every call fail with an API error.
    pub fn fail_with(status: u16, message: impl Into<String>) -> Self {
        Self {
            error: Some((status, message.into())),
            ..Self::default()
        }
    }

    /// The filter passed to the most recent `find_requests` call.
    pub fn last_filter(&self) -> Option<RequestFilter> {
        self.filters_seen.lock().unwrap().last().cloned()
    }

    /// Number of `find_requests` calls made.
    pub fn call_count(&self) -> usize {
        self.filters_seen.lock().unwrap().len()
    }
}

impl RmClient for MockRmClient {
    fn find_requests(&self, filter: &RequestFilter) -> Result<Vec<Request>> {
        self.filters_seen.lock().unwrap().push(filter.clone());
        if let Some((status, message)) = &self.error {
            return Err(ClientError::api_error(*status, message.clone()));
        }
        Ok(self.requests.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_filters() {
        let mock = MockRmClient::new();
        let filter = RequestFilter {
            limit: 5,
            ..Default::default()
        };
        mock.find_requests(&filter).unwrap();

        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_filter().unwrap().limit, 5);
    }

    #[test]
    fn test_mock_error() {
        let mock = MockRmClient::fail_with(500, "db down");
        let err = mock.find_requests(&RequestFilter::default()).unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("db down"));
    }
}
