//! Upstream transport abstraction.
//!
//! The dispatcher only speaks to the CWE API through [`Transport`], so it
//! can be exercised against in-memory fakes. [`HttpTransport`] is the
//! production implementation over `reqwest`.

mod http;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpTransport;

/// A GET request relative to the API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    /// Path joined onto the base URL, without a leading slash (`cwe/79/parents`).
    pub path: String,
    /// Query parameters in the order they are sent.
    pub query: Vec<(String, String)>,
    /// Overrides the transport's default timeout.
    pub timeout: Option<Duration>,
}

impl UpstreamRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            timeout: None,
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Raw upstream answer. Non-success statuses are still responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request did not produce a response at all.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Executes GET requests against the CWE API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns whatever status and body came back.
    ///
    /// Only failures to obtain a response (connection refused, timeout,
    /// unreadable body) are errors.
    async fn get(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError>;
}
