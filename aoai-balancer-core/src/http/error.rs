//! Upstream error body inspection

use serde_json::Value;

/// Error code Azure returns when a prompt or completion trips the content filter
pub const CONTENT_FILTER_CODE: &str = "content_filter";

/// Fallback message when an upstream body carries none
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Extract `error.code` from an upstream body
pub fn error_code(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(|error| error.get("code"))
        .and_then(Value::as_str)
}

/// True for a 400 whose body is a content filter rejection
pub fn is_content_filter(status: u16, body: &Value) -> bool {
    status == 400 && error_code(body) == Some(CONTENT_FILTER_CODE)
}

/// Extract a human readable message from an upstream body.
///
/// Tries the common formats in order:
/// `{"error": {"message": ...}}`, `{"message": ...}`, `{"error": "..."}`.
pub fn error_message(body: &Value) -> Option<String> {
    if let Some(message) = body
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
    {
        return Some(message.to_string());
    }

    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    body.get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Message to surface to the caller for an upstream failure
pub fn surface_message(body: &Value) -> String {
    error_message(body).unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_filter_detection() {
        let body = json!({ "error": { "code": "content_filter", "message": "filtered" } });
        assert!(is_content_filter(400, &body));
        assert!(!is_content_filter(429, &body));
        assert!(!is_content_filter(400, &json!({ "error": { "code": "invalid_prompt" } })));
        assert!(!is_content_filter(400, &json!({ "error": "content_filter" })));
        assert!(!is_content_filter(400, &Value::Null));
    }

    #[test]
    fn test_error_message_formats() {
        assert_eq!(
            error_message(&json!({ "error": { "message": "nested" } })).as_deref(),
            Some("nested")
        );
        assert_eq!(
            error_message(&json!({ "message": "top" })).as_deref(),
            Some("top")
        );
        assert_eq!(
            error_message(&json!({ "error": "flat" })).as_deref(),
            Some("flat")
        );
        assert_eq!(error_message(&json!({ "status": 500 })), None);
    }

    #[test]
    fn test_surface_message_fallback() {
        assert_eq!(surface_message(&Value::Null), UNKNOWN_ERROR_MESSAGE);
    }
}
