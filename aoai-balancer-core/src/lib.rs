//! aoai-balancer core library
//!
//! Sends chat-completion requests to a list of interchangeable Azure OpenAI
//! deployments, failing over to the next deployment on timeouts, 429 and 503
//! responses, and stopping at the first content filter rejection or other
//! hard failure.

pub mod config;
pub mod failover;
pub mod http;
pub mod protocol;
pub mod service;

pub use config::{BalancerConfig, ConfigError};
pub use failover::{
    BackoffPolicy, Endpoint, EndpointPool, ErrorClassification, FailoverEngine, FailoverError,
    FailoverResult, FixedBackoff,
};
pub use http::{AttemptOutcome, DispatchRequest, Dispatcher};
pub use protocol::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, MessageRole};
pub use service::ChatService;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
