//! Long-running operation helpers
//!
//! Resource Manager signals an asynchronous operation with a 201/202 response carrying
//! an `Azure-AsyncOperation` header (status resource) or a `Location` header (poll until
//! it stops answering 202). `Azure-AsyncOperation` is preferred when both are present.

use std::time::Duration;

use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use serde::Deserialize;

use crate::config::RuntimeOptions;

const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";

/// Poll cadence and upper bound for one long-running operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LroPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl LroPolicy {
    #[must_use]
    pub fn from_options(options: &RuntimeOptions) -> Self {
        Self {
            poll_interval: options.lro_poll_interval(),
            timeout: options.lro_timeout(),
        }
    }
}

impl Default for LroPolicy {
    fn default() -> Self {
        Self::from_options(&RuntimeOptions::default())
    }
}

/// Where to poll for completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTarget {
    AsyncOperation(String),
    Location(String),
}

impl PollTarget {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            PollTarget::AsyncOperation(url) | PollTarget::Location(url) => url,
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl reqwest::header::AsHeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Poll target advertised by a response, if any
#[must_use]
pub fn poll_target(headers: &HeaderMap) -> Option<PollTarget> {
    header_str(headers, AZURE_ASYNC_OPERATION)
        .map(|url| PollTarget::AsyncOperation(url.to_string()))
        .or_else(|| header_str(headers, LOCATION).map(|url| PollTarget::Location(url.to_string())))
}

/// Delay requested by `Retry-After` (delta-seconds form), else `default`
#[must_use]
pub fn retry_after(headers: &HeaderMap, default: Duration) -> Duration {
    header_str(headers, RETRY_AFTER)
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

/// Status of an asynchronous operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl OperationState {
    /// Parse the `status` field; unknown values (`Enqueued`, `Dequeued`, ...) are in progress
    #[must_use]
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "succeeded" => OperationState::Succeeded,
            "failed" => OperationState::Failed,
            "canceled" | "cancelled" => OperationState::Canceled,
            _ => OperationState::InProgress,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, OperationState::InProgress)
    }
}

/// Body of an `Azure-AsyncOperation` status resource
#[derive(Debug, Deserialize)]
pub(crate) struct OperationStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OperationError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl OperationStatus {
    pub fn state(&self) -> OperationState {
        OperationState::parse(&self.status)
    }

    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .map(|e| {
                format!(
                    "{}: {}",
                    e.code.as_deref().unwrap_or("Unknown"),
                    e.message.as_deref().unwrap_or("no message")
                )
            })
            .unwrap_or_else(|| "no error details".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_async_operation_header_is_preferred() {
        let map = headers(&[
            ("location", "https://example/location"),
            ("azure-asyncoperation", "https://example/status"),
        ]);
        assert_eq!(
            poll_target(&map),
            Some(PollTarget::AsyncOperation(
                "https://example/status".to_string()
            ))
        );
    }

    #[test]
    fn test_location_header_is_used_alone() {
        let map = headers(&[("location", "https://example/location")]);
        assert_eq!(
            poll_target(&map).map(|t| t.url().to_string()),
            Some("https://example/location".to_string())
        );
        assert_eq!(poll_target(&HeaderMap::new()), None);
    }

    #[test]
    fn test_retry_after_seconds_or_default() {
        let default = Duration::from_secs(5);
        assert_eq!(
            retry_after(&headers(&[("retry-after", "12")]), default),
            Duration::from_secs(12)
        );
        assert_eq!(
            retry_after(
                &headers(&[("retry-after", "Wed, 21 Oct 2015 07:28:00 GMT")]),
                default
            ),
            default
        );
    }

    #[test]
    fn test_operation_state_parsing() {
        assert_eq!(OperationState::parse("Succeeded"), OperationState::Succeeded);
        assert_eq!(OperationState::parse("Canceled"), OperationState::Canceled);
        assert_eq!(OperationState::parse("Enqueued"), OperationState::InProgress);
        assert!(!OperationState::parse("Dequeued").is_terminal());
        assert!(OperationState::parse("FAILED").is_terminal());
    }

    #[test]
    fn test_operation_status_error_message() {
        let status: OperationStatus = serde_json::from_str(
            r#"{"status":"Failed","error":{"code":"BadRequest","message":"nope"}}"#,
        )
        .expect("status body");
        assert_eq!(status.state(), OperationState::Failed);
        assert_eq!(status.error_message(), "BadRequest: nope");
    }
}
