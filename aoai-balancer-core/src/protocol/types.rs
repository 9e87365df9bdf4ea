//! Chat completion request and response types
//!
//! These mirror the Azure OpenAI chat-completions shapes. Requests are strict:
//! a message without a role or content does not deserialize. Responses are
//! lenient: every field has a default so that a structurally odd body still
//! decodes, and validation of the consumed path is left to the calling layer.

use crate::failover::FailoverError;
use serde::{Deserialize, Deserializer, Serialize};

/// Read `null` the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Role of a message in the conversation.
///
/// Roles outside the known set (`function`, `developer`, ...) are kept as
/// [`MessageRole::Other`] and sent unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
    /// Tool response
    Tool,
    #[serde(untagged)]
    Other(String),
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Requested output format, e.g. `{"type": "json_object"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

/// Chat completion request as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Messages in the conversation, in order
    pub messages: Vec<ChatMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 to 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
}

/// Chat completion response returned by a deployment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatCompletionResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

/// One generated choice
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Choice {
    #[serde(deserialize_with = "null_as_default")]
    pub index: u32,
    pub message: Option<ResponseMessage>,
    pub finish_reason: Option<String>,
}

/// Message inside a choice. Both fields are optional because filtered or
/// truncated completions may omit them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMessage {
    pub role: Option<MessageRole>,
    pub content: Option<String>,
}

/// Token usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    #[serde(deserialize_with = "null_as_default")]
    pub prompt_tokens: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub completion_tokens: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_tokens: u32,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

impl ChatCompletionRequest {
    /// Create a request with only messages set
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            seed: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            response_format: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }

    /// Parse a request from untyped JSON, rejecting malformed messages
    pub fn from_json(value: serde_json::Value) -> Result<Self, FailoverError> {
        serde_json::from_value(value)
            .map_err(|e| FailoverError::InvalidRequest(format!("Malformed chat request: {}", e)))
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_response_format(mut self, format_type: impl Into<String>) -> Self {
        self.response_format = Some(ResponseFormat {
            format_type: format_type.into(),
        });
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }
}

impl ChatCompletionResponse {
    /// Content of the first choice, if the response carries a non-empty one
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}
