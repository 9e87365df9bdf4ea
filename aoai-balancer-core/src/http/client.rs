//! Dispatcher implementation using reqwest

use crate::http::{
    AttemptOutcome, DispatchRequest, Dispatcher, TransportError, API_KEY_HEADER, DEFAULT_TIMEOUT,
};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Default user agent
const USER_AGENT: &str = concat!("aoai-balancer/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP dispatcher
#[derive(Clone)]
pub struct HttpDispatcher {
    /// The underlying reqwest client
    client: Arc<Client>,

    /// Per-attempt timeout
    timeout: Duration,
}

impl HttpDispatcher {
    /// Create a dispatcher with the standard 30 second timeout
    pub fn new() -> Result<Self, String> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a dispatcher with a custom per-attempt timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, String> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client: Arc::new(client),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Parse a response body as JSON; empty or non-JSON text yields `None`
fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    serde_json::from_str(text).ok()
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, request: DispatchRequest<'_>) -> AttemptOutcome {
        let response = match self
            .client
            .post(request.url())
            .timeout(self.timeout)
            .header(API_KEY_HEADER, request.endpoint.api_key().expose_secret())
            .json(request.payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::Transport(TransportError::from(e)),
        };

        let status = response.status();

        // Body read failures (including the timeout firing mid-body) are transport failures
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return AttemptOutcome::Transport(TransportError::from(e)),
        };

        if status.is_success() {
            AttemptOutcome::Success {
                status: status.as_u16(),
                body: parse_body(&text),
            }
        } else {
            let body = parse_body(&text).unwrap_or_else(|| {
                if text.is_empty() {
                    Value::Null
                } else {
                    json!({ "message": text })
                }
            });
            AttemptOutcome::Upstream {
                status: status.as_u16(),
                body,
            }
        }
    }
}
