//! Protocol module for chat-completion request/response structures
//!
//! Defines the caller-facing data model and its mapping to the wire payload
//! posted to each deployment.

pub mod serialize;
pub mod types;

pub use serialize::{RequestSerializer, WireMessage, WirePayload};
pub use types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, MessageRole,
    ResponseFormat, ResponseMessage, Usage,
};
