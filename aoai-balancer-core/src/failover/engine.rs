//! Ordered failover across the endpoint pool
//!
//! Every call walks the pool from index 0. Each endpoint gets exactly one
//! attempt; a timeout or a 429/503 backs off and moves on, a content filter
//! rejection or any other failure ends the call immediately, and running off
//! the end of the pool is reported as [`FailoverError::EndpointsExhausted`].
//!
//! Calls share nothing but the immutable pool, so concurrent callers all start
//! on the same low-index endpoint.

use super::backoff::{BackoffPolicy, FixedBackoff};
use super::error::{ErrorClassification, FailoverError};
use super::pool::EndpointPool;
use crate::config::{BalancerConfig, ConfigError, ConfigValidator};
use crate::http::client::HttpDispatcher;
use crate::http::error::{is_content_filter, surface_message};
use crate::http::{AttemptOutcome, DispatchRequest, Dispatcher};
use crate::protocol::{ChatCompletionRequest, ChatCompletionResponse, RequestSerializer};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// One failed attempt, kept for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    /// Position of the endpoint in the pool
    pub endpoint_index: usize,

    /// Endpoint address
    pub address: String,

    /// Upstream status, when a response was received
    pub status: Option<u16>,

    /// Why the attempt was abandoned; `None` for a 2xx without a usable body
    pub classification: Option<ErrorClassification>,

    pub detail: String,
}

/// Successful failover call
#[derive(Debug, Clone)]
pub struct FailoverResult {
    pub response: ChatCompletionResponse,

    /// Index of the endpoint that answered
    pub endpoint_index: usize,

    /// Failed attempts that preceded the success
    pub failed_attempts: Vec<AttemptRecord>,
}

impl FailoverResult {
    /// Whether any endpoint other than the first one answered
    pub fn used_fallback(&self) -> bool {
        self.endpoint_index > 0
    }
}

/// What the engine does with one attempt outcome
#[derive(Debug)]
enum Step {
    /// 200 with a body
    Succeeded(Value),
    /// 2xx that cannot be returned; move on without waiting
    Skip { status: u16 },
    /// Back off, then move on
    Recover {
        classification: ErrorClassification,
        status: Option<u16>,
        detail: String,
    },
    /// Terminal failure
    Abort(FailoverError),
}

fn classify(outcome: AttemptOutcome) -> Step {
    match outcome {
        AttemptOutcome::Success {
            status: 200,
            body: Some(body),
        } => Step::Succeeded(body),

        AttemptOutcome::Success { status, .. } => Step::Skip { status },

        AttemptOutcome::Transport(err) if err.is_timeout() => Step::Recover {
            classification: ErrorClassification::Timeout,
            status: None,
            detail: err.to_string(),
        },

        AttemptOutcome::Transport(err) => Step::Abort(FailoverError::Transport(err)),

        AttemptOutcome::Upstream { status, body } if is_content_filter(status, &body) => {
            Step::Abort(FailoverError::ContentFilterRejected { body })
        }

        AttemptOutcome::Upstream { status, body } => {
            let classification = ErrorClassification::from_status(status);
            let message = surface_message(&body);
            if classification.is_recoverable() {
                Step::Recover {
                    classification,
                    status: Some(status),
                    detail: message,
                }
            } else {
                Step::Abort(FailoverError::Upstream {
                    status,
                    message,
                    body,
                })
            }
        }
    }
}

fn decode_response(body: Value) -> Result<ChatCompletionResponse, FailoverError> {
    if !body.is_object() {
        return Err(FailoverError::MalformedResponse(format!(
            "Expected a JSON object, got: {}",
            body
        )));
    }
    serde_json::from_value(body)
        .map_err(|e| FailoverError::MalformedResponse(format!("Invalid response format: {}", e)))
}

/// Failover engine over an immutable endpoint pool
#[derive(Clone)]
pub struct FailoverEngine {
    pool: Arc<EndpointPool>,
    dispatcher: Arc<dyn Dispatcher>,
    backoff: Arc<dyn BackoffPolicy>,
    serializer: RequestSerializer,
}

impl FailoverEngine {
    /// Create an engine from explicit collaborators
    pub fn new(
        pool: EndpointPool,
        dispatcher: Arc<dyn Dispatcher>,
        backoff: Arc<dyn BackoffPolicy>,
    ) -> Self {
        Self {
            pool: Arc::new(pool),
            dispatcher,
            backoff,
            serializer: RequestSerializer::new(),
        }
    }

    pub fn builder() -> FailoverBuilder {
        FailoverBuilder::new()
    }

    /// Create an engine with the HTTP dispatcher and backoff described by `config`.
    ///
    /// The config is validated first, so one assembled in code gets the same
    /// checks as one loaded from the environment or a file.
    pub fn from_config(config: &BalancerConfig) -> Result<Self, FailoverError> {
        ConfigValidator::new()
            .validate(config)
            .map_err(ConfigError::from)?;

        let pool = EndpointPool::new(config.endpoints.clone(), config.api_keys.clone())?;
        let dispatcher = HttpDispatcher::with_timeout(config.timeout())
            .map_err(|message| ConfigError::Invalid { message })?;

        Ok(Self::new(pool, Arc::new(dispatcher), config.backoff.build()))
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    /// Run one logical chat call and return the first usable response
    pub async fn execute(
        &self,
        deployment_name: &str,
        method: &str,
        api_version: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, FailoverError> {
        self.execute_detailed(deployment_name, method, api_version, request)
            .await
            .map(|result| result.response)
    }

    /// Like [`execute`](Self::execute), also reporting which endpoint answered
    /// and the attempts that failed before it
    pub async fn execute_detailed(
        &self,
        deployment_name: &str,
        method: &str,
        api_version: &str,
        request: &ChatCompletionRequest,
    ) -> Result<FailoverResult, FailoverError> {
        let call_id = Uuid::new_v4();
        let payload = self.serializer.serialize(request)?;
        let mut failed_attempts = Vec::new();

        info!(
            "Dispatching chat/{} to deployment {} over {} endpoints [call_id: {}]",
            method,
            deployment_name,
            self.pool.len(),
            call_id
        );

        for (index, endpoint) in self.pool.iter().enumerate() {
            debug!(
                "Trying endpoint {} ({}) [call_id: {}]",
                index,
                endpoint.address(),
                call_id
            );

            let outcome = self
                .dispatcher
                .dispatch(DispatchRequest {
                    endpoint,
                    deployment_name,
                    method,
                    api_version,
                    payload: &payload,
                })
                .await;

            match classify(outcome) {
                Step::Succeeded(body) => {
                    let response = decode_response(body)?;
                    info!(
                        "Endpoint {} answered after {} failed attempts [call_id: {}]",
                        index,
                        failed_attempts.len(),
                        call_id
                    );
                    return Ok(FailoverResult {
                        response,
                        endpoint_index: index,
                        failed_attempts,
                    });
                }
                Step::Skip { status } => {
                    warn!(
                        "Endpoint {} returned {} without a usable body, moving on [call_id: {}]",
                        index, status, call_id
                    );
                    failed_attempts.push(AttemptRecord {
                        endpoint_index: index,
                        address: endpoint.address().to_string(),
                        status: Some(status),
                        classification: None,
                        detail: "Empty success response".to_string(),
                    });
                }
                Step::Recover {
                    classification,
                    status,
                    detail,
                } => {
                    warn!(
                        "Endpoint {} failed ({:?}): {}, backing off [call_id: {}]",
                        index, classification, detail, call_id
                    );
                    failed_attempts.push(AttemptRecord {
                        endpoint_index: index,
                        address: endpoint.address().to_string(),
                        status,
                        classification: Some(classification),
                        detail,
                    });
                    self.backoff.wait(index).await;
                }
                Step::Abort(err) => {
                    error!(
                        "Endpoint {} failed terminally: {} [call_id: {}]",
                        index, err, call_id
                    );
                    return Err(err);
                }
            }
        }

        error!(
            "All {} endpoints are failed [call_id: {}]",
            failed_attempts.len(),
            call_id
        );
        Err(FailoverError::EndpointsExhausted {
            attempts: failed_attempts.len(),
        })
    }
}

/// Builder for [`FailoverEngine`]
#[derive(Default)]
pub struct FailoverBuilder {
    pool: Option<EndpointPool>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    backoff: Option<Arc<dyn BackoffPolicy>>,
}

impl FailoverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint pool (required)
    pub fn pool(mut self, pool: EndpointPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Set the dispatcher; defaults to [`HttpDispatcher`] with a 30 second timeout
    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Set the backoff policy; defaults to [`FixedBackoff`]
    pub fn backoff(mut self, backoff: Arc<dyn BackoffPolicy>) -> Self {
        self.backoff = Some(backoff);
        self
    }

    pub fn build(self) -> Result<FailoverEngine, FailoverError> {
        let pool = self.pool.ok_or_else(|| ConfigError::Invalid {
            message: "Endpoint pool required".to_string(),
        })?;

        let dispatcher = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(
                HttpDispatcher::new().map_err(|message| ConfigError::Invalid { message })?,
            ),
        };

        let backoff = self
            .backoff
            .unwrap_or_else(|| Arc::new(FixedBackoff::default()));

        Ok(FailoverEngine::new(pool, dispatcher, backoff))
    }
}
