//! Wire payload construction for one deployment call

use super::types::{ChatCompletionRequest, ChatMessage, MessageRole, ResponseFormat};
use crate::failover::FailoverError;
use serde::Serialize;

/// Message as it travels on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: MessageRole,
    pub content: String,
}

/// JSON body posted to `/chat/{method}`. Absent optionals are omitted rather
/// than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WirePayload {
    pub messages: Vec<WireMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
}

/// Maps caller requests into wire payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSerializer;

impl RequestSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Build the wire payload for `request`.
    ///
    /// Fails with [`FailoverError::InvalidRequest`] when the conversation is
    /// empty; nothing is dispatched in that case.
    pub fn serialize(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<WirePayload, FailoverError> {
        if request.messages.is_empty() {
            return Err(FailoverError::InvalidRequest(
                "Chat request must contain at least one message".to_string(),
            ));
        }

        Ok(WirePayload {
            messages: request.messages.iter().map(serialize_message).collect(),
            seed: request.seed,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            response_format: request.response_format.clone(),
            frequency_penalty: request.frequency_penalty,
            presence_penalty: request.presence_penalty,
        })
    }
}

fn serialize_message(message: &ChatMessage) -> WireMessage {
    WireMessage {
        role: message.role.clone(),
        content: message.content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const OPTIONAL_KEYS: [&str; 7] = [
        "seed",
        "max_tokens",
        "temperature",
        "top_p",
        "response_format",
        "frequency_penalty",
        "presence_penalty",
    ];

    #[test]
    fn test_messages_only_payload_has_no_optional_keys() {
        let request = ChatCompletionRequest::new(vec![ChatMessage::user("hi")]);
        let payload = RequestSerializer::new().serialize(&request).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value, json!({ "messages": [{ "role": "user", "content": "hi" }] }));
    }

    #[test]
    fn test_present_optionals_are_copied() {
        let request = ChatCompletionRequest::new(vec![ChatMessage::user("hi")])
            .with_seed(7)
            .with_max_tokens(64)
            .with_response_format("json_object");
        let value = serde_json::to_value(RequestSerializer::new().serialize(&request).unwrap())
            .unwrap();

        assert_eq!(value["seed"], json!(7));
        assert_eq!(value["max_tokens"], json!(64));
        assert_eq!(value["response_format"], json!({ "type": "json_object" }));
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_function_role_passes_through() {
        let request = ChatCompletionRequest::new(vec![
            ChatMessage::user("What is the weather?"),
            ChatMessage::new(MessageRole::Other("function".to_string()), "{\"temp\": 21}"),
        ]);
        let payload = RequestSerializer::new().serialize(&request).unwrap();
        let value = serde_json::to_value(payload).unwrap();
        assert_eq!(
            value["messages"][1],
            json!({ "role": "function", "content": "{\"temp\": 21}" })
        );
    }

    #[test]
    fn test_empty_conversation_is_rejected() {
        let request = ChatCompletionRequest::new(vec![]);
        let err = RequestSerializer::new().serialize(&request).unwrap_err();
        assert!(matches!(err, FailoverError::InvalidRequest(_)));
    }

    fn arb_role() -> impl Strategy<Value = MessageRole> {
        prop_oneof![
            Just(MessageRole::System),
            Just(MessageRole::User),
            Just(MessageRole::Assistant),
            Just(MessageRole::Tool),
            "[a-z_]{1,12}".prop_map(MessageRole::Other),
        ]
    }

    proptest! {
        #[test]
        fn prop_absent_optionals_never_emitted(
            contents in prop::collection::vec(("[a-z ]{0,16}", arb_role()), 1..6),
            seed in prop::option::of(any::<i64>()),
            max_tokens in prop::option::of(1u32..4096),
            temperature in prop::option::of(0.0f32..2.0),
            top_p in prop::option::of(0.0f32..1.0),
        ) {
            let messages: Vec<ChatMessage> = contents
                .iter()
                .map(|(content, role)| ChatMessage::new(role.clone(), content.clone()))
                .collect();
            let mut request = ChatCompletionRequest::new(messages.clone());
            request.seed = seed;
            request.max_tokens = max_tokens;
            request.temperature = temperature;
            request.top_p = top_p;

            let payload = RequestSerializer::new().serialize(&request).unwrap();
        let value = serde_json::to_value(payload).unwrap();
            let object = value.as_object().unwrap();

            prop_assert_eq!(object.contains_key("seed"), seed.is_some());
            prop_assert_eq!(object.contains_key("max_tokens"), max_tokens.is_some());
            prop_assert_eq!(object.contains_key("temperature"), temperature.is_some());
            prop_assert_eq!(object.contains_key("top_p"), top_p.is_some());
            for key in &OPTIONAL_KEYS[4..] {
                prop_assert!(!object.contains_key(*key));
            }

            let wire = object["messages"].as_array().unwrap();
            prop_assert_eq!(wire.len(), messages.len());
            for (sent, original) in wire.iter().zip(&messages) {
                prop_assert_eq!(sent["content"].as_str().unwrap(), original.content.as_str());
                prop_assert_eq!(
                    sent["role"].clone(),
                    serde_json::to_value(&original.role).unwrap()
                );
            }
        }
    }
}
