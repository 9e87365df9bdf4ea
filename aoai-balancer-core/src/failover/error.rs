//! Failover error types and classification

use crate::config::ConfigError;
use crate::http::TransportError;
use serde_json::Value;
use thiserror::Error;

/// Opaque application code surfaced for content filter rejections
pub const CONTENT_FILTER_APP_CODE: &str = "NET_E_CONTENT_FILTER_UNSAFE";

/// Opaque application code surfaced for rate-limit class failures
pub const TOO_MANY_REQUESTS_APP_CODE: &str = "NET_E_TOO_MANY_REQUESTS";

/// How a single failure is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClassification {
    /// Per-attempt timeout; handled like a rate limit
    Timeout,
    /// Upstream refused the content; never retried
    ContentFilterRejected,
    /// 429 / 503, or every endpoint exhausted
    RateLimitedOrUnavailable,
    /// Any other non-success upstream status
    UpstreamError,
    /// No response obtained for a reason other than timeout
    TransportError,
    /// Endpoint or key lists unusable
    Configuration,
    /// Request rejected before dispatch
    InvalidRequest,
    /// Success status with a body the caller cannot use
    MalformedResponse,
}

impl ErrorClassification {
    /// Classify an upstream status (content filter is detected separately)
    pub fn from_status(status: u16) -> Self {
        match status {
            429 | 503 => Self::RateLimitedOrUnavailable,
            _ => Self::UpstreamError,
        }
    }

    /// Whether the engine backs off and moves to the next endpoint
    pub fn is_recoverable(self) -> bool {
        matches!(self, Self::Timeout | Self::RateLimitedOrUnavailable)
    }
}

/// Terminal failure of a failover call
#[derive(Debug, Error)]
pub enum FailoverError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream body is surfaced unchanged
    #[error("Content filter rejected the request: {body}")]
    ContentFilterRejected { body: Value },

    #[error("Upstream error ({status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        body: Value,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("All endpoints are failed ({attempts} attempted)")]
    EndpointsExhausted { attempts: usize },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl FailoverError {
    pub fn classification(&self) -> ErrorClassification {
        match self {
            Self::Configuration(_) => ErrorClassification::Configuration,
            Self::InvalidRequest(_) => ErrorClassification::InvalidRequest,
            Self::ContentFilterRejected { .. } => ErrorClassification::ContentFilterRejected,
            Self::Upstream { status, .. } => ErrorClassification::from_status(*status),
            Self::Transport(err) if err.is_timeout() => ErrorClassification::Timeout,
            Self::Transport(_) => ErrorClassification::TransportError,
            Self::EndpointsExhausted { .. } => ErrorClassification::RateLimitedOrUnavailable,
            Self::MalformedResponse(_) => ErrorClassification::MalformedResponse,
        }
    }

    /// Whether the caller may retry the whole call later
    pub fn is_recoverable(&self) -> bool {
        self.classification().is_recoverable()
    }

    /// HTTP status to report to a caller, when one applies.
    ///
    /// Content filter rejections carry an application code instead, see
    /// [`application_code`](Self::application_code).
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::EndpointsExhausted { .. } => Some(429),
            Self::InvalidRequest(_) => Some(400),
            Self::MalformedResponse(_) => Some(502),
            _ => None,
        }
    }

    /// Application level code distinguishing conditions that have no HTTP status
    pub fn application_code(&self) -> Option<&'static str> {
        match self {
            Self::ContentFilterRejected { .. } => Some(CONTENT_FILTER_APP_CODE),
            Self::EndpointsExhausted { .. } => Some(TOO_MANY_REQUESTS_APP_CODE),
            _ => None,
        }
    }

    /// Upstream body, for errors that carry one
    pub fn upstream_body(&self) -> Option<&Value> {
        match self {
            Self::ContentFilterRejected { body } | Self::Upstream { body, .. } => Some(body),
            _ => None,
        }
    }
}
