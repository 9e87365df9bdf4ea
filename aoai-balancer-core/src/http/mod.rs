//! HTTP layer for deployment calls
//!
//! This module implements the single-attempt transport used by the failover
//! engine:
//! - The [`Dispatcher`] seam and its reqwest implementation
//! - URL construction for the deployments API
//! - Tagged attempt outcomes instead of thrown errors
//!
//! A dispatcher performs exactly one call. It never retries, logs, or decides
//! what a status code means; that is the engine's job.

pub mod client;
pub mod error;

use crate::failover::Endpoint;
use crate::protocol::WirePayload;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Per-attempt timeout applied to every deployment call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the deployment key
pub const API_KEY_HEADER: &str = "api-key";

/// Everything needed to address one deployment call
#[derive(Debug, Clone, Copy)]
pub struct DispatchRequest<'a> {
    pub endpoint: &'a Endpoint,
    pub deployment_name: &'a str,
    pub method: &'a str,
    pub api_version: &'a str,
    pub payload: &'a WirePayload,
}

impl DispatchRequest<'_> {
    /// Full URL for this call
    pub fn url(&self) -> String {
        build_url(
            self.endpoint.address(),
            self.deployment_name,
            self.method,
            self.api_version,
        )
    }
}

/// Build `{address}/openai/deployments/{deployment}/chat/{method}?api-version={version}`
pub fn build_url(address: &str, deployment_name: &str, method: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/{}?api-version={}",
        address, deployment_name, method, api_version
    )
}

/// What one attempt produced
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// 2xx response. `body` is `None` when the response had no JSON body.
    Success { status: u16, body: Option<Value> },

    /// Non-2xx response with its (possibly synthesized) JSON error body
    Upstream { status: u16, body: Value },

    /// No response was obtained
    Transport(TransportError),
}

/// Kind of transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The per-attempt timeout elapsed
    Timeout,
    /// Connection could not be established (refused, DNS, TLS)
    Connect,
    /// Anything else raised by the HTTP stack
    Other,
}

/// A failure in which no HTTP response was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TransportErrorKind::Timeout => write!(f, "Request timeout: {}", self.message),
            TransportErrorKind::Connect => write!(f, "Connection failed: {}", self.message),
            TransportErrorKind::Other => write!(f, "Network error: {}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

/// Performs one call against one deployment
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, request: DispatchRequest<'_>) -> AttemptOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let url = build_url(
            "https://east.openai.azure.com",
            "gpt-4o",
            "completions",
            "2024-02-15-preview",
        );
        assert_eq!(
            url,
            "https://east.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-15-preview"
        );
    }

    #[test]
    fn test_transport_error_display() {
        assert_eq!(
            TransportError::timeout("30s elapsed").to_string(),
            "Request timeout: 30s elapsed"
        );
        let err = TransportError::new(TransportErrorKind::Connect, "refused");
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "Connection failed: refused");
    }
}
