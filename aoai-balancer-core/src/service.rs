//! Chat service consumed by request handlers
//!
//! Wraps a [`FailoverEngine`] with the deployment settings from configuration
//! and validates that the response carries a message before handing its
//! content back.

use crate::config::{BalancerConfig, DEFAULT_METHOD};
use crate::failover::{FailoverEngine, FailoverError};
use crate::protocol::ChatCompletionRequest;
use tracing::{error, info};

/// Error text when a response lacks `choices[0].message.content`
pub const INVALID_RESPONSE_FORMAT: &str = "Invalid response format from Azure OpenAI";

/// Sends chat requests through the failover engine
#[derive(Clone)]
pub struct ChatService {
    engine: FailoverEngine,
    deployment_name: String,
    api_version: String,
    method: String,
}

impl ChatService {
    pub fn new(
        engine: FailoverEngine,
        deployment_name: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            deployment_name: deployment_name.into(),
            api_version: api_version.into(),
            method: DEFAULT_METHOD.to_string(),
        }
    }

    /// Build the service and its HTTP-backed engine from configuration
    pub fn from_config(config: &BalancerConfig) -> Result<Self, FailoverError> {
        let engine = FailoverEngine::from_config(config)?;
        info!(
            "Chat service ready for deployment {} with endpoints {:?}",
            config.deployment_name,
            config.describe_endpoints()
        );

        let mut service = Self::new(engine, &config.deployment_name, &config.api_version);
        service.method = config.method.clone();
        Ok(service)
    }

    pub fn engine(&self) -> &FailoverEngine {
        &self.engine
    }

    pub fn deployment_name(&self) -> &str {
        &self.deployment_name
    }

    /// Send `request` and return the content of the first choice
    pub async fn post_message(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<String, FailoverError> {
        let response = self
            .engine
            .execute(&self.deployment_name, &self.method, &self.api_version, request)
            .await
            .inspect_err(|e| error!("Error in post_message: {}", e))?;

        match response.first_content() {
            Some(content) => Ok(content.to_string()),
            None => {
                error!("{} (response id: {:?})", INVALID_RESPONSE_FORMAT, response.id);
                Err(FailoverError::MalformedResponse(
                    INVALID_RESPONSE_FORMAT.to_string(),
                ))
            }
        }
    }
}
