//! Canonical-text extraction from heterogeneous provider responses.
//!
//! Each known response layout is a `ResponseShape`; extraction tries the
//! shapes in priority order and takes the first match. A miss is `None`,
//! never an error.

use serde_json::Value;

/// Known layouts of image-understanding responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{"messages": [..., {"content": "..." | [...]}]}`
    Messages,
    /// `{"candidates": [{"content": "..." | {"parts": [...]} | {"text": "..."}}]}`
    Candidates,
}

impl ResponseShape {
    /// Order in which shapes are tried.
    pub const PRIORITY: [ResponseShape; 2] = [ResponseShape::Messages, ResponseShape::Candidates];

    /// Extract text if `body` has this shape.
    pub fn extract(self, body: &Value) -> Option<String> {
        let text = match self {
            ResponseShape::Messages => messages_text(body),
            ResponseShape::Candidates => candidates_text(body),
        };
        text.filter(|t| !t.is_empty())
    }
}

/// Last message's content: a string, or the first list item exposing `text`
/// or a nested string `content`.
fn messages_text(body: &Value) -> Option<String> {
    let content = body.get("messages")?.as_array()?.last()?.get("content")?;
    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(|item| {
            let item = item.as_object()?;
            match (item.get("text"), item.get("content")) {
                (Some(text), _) => text.as_str().map(String::from),
                (None, Some(Value::String(nested))) => Some(nested.clone()),
                _ => None,
            }
        }),
        _ => None,
    }
}

/// First candidate's content: a string, the first part exposing `text`, or a
/// direct `text` field.
fn candidates_text(body: &Value) -> Option<String> {
    let content = body.get("candidates")?.as_array()?.first()?.get("content")?;
    match content {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => match map.get("parts") {
            Some(parts) => parts
                .as_array()?
                .iter()
                .find_map(|part| part.get("text").and_then(Value::as_str))
                .map(String::from),
            None => map.get("text").and_then(Value::as_str).map(String::from),
        },
        _ => None,
    }
}

/// Extract canonical text, trying every `ResponseShape` in priority order.
pub fn extract_canonical_text(body: &Value) -> Option<String> {
    ResponseShape::PRIORITY
        .iter()
        .find_map(|shape| shape.extract(body))
}

/// Fields a video-understanding response may carry its text in, by priority.
pub const VIDEO_TEXT_FIELDS: &[&str] = &[
    "text",
    "generatedText",
    "description",
    "output",
    "content",
    "message",
];

/// Extract the description from a video-understanding response.
///
/// Each field in `VIDEO_TEXT_FIELDS` may hold a string or an object with a
/// string `text`. When none match, the whole body is returned as pretty JSON
/// so the caller still records what the model said.
pub fn extract_description(body: &Value) -> String {
    VIDEO_TEXT_FIELDS
        .iter()
        .find_map(|field| match body.get(*field)? {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("text").and_then(Value::as_str).map(String::from),
            _ => None,
        })
        .unwrap_or_else(|| serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string()))
}

/// Best human-readable error message in a provider error body.
///
/// Looks at `error.message` (or a bare `error` string) and appends a nested
/// `provider.error.message` when present. Bedrock-style `message`/`Message`
/// fields are used when there is no `error` key.
pub fn error_message(body: &Value) -> Option<String> {
    let base = match body.get("error") {
        Some(Value::Object(err)) => err.get("message").and_then(Value::as_str).map(String::from),
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) if !other.is_null() => Some(other.to_string()),
        _ => ["message", "Message"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(String::from),
    };

    let provider = body
        .get("provider")
        .and_then(|p| p.get("error"))
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty());

    match (base, provider) {
        (Some(base), Some(provider)) => Some(format!("{base} | Provider error: {provider}")),
        (Some(base), None) => Some(base),
        (None, Some(provider)) => Some(format!("Provider error: {provider}")),
        (None, None) => None,
    }
}

/// Error message, else the raw body, else `HTTP <status>`.
pub fn error_message_or_body(body: &Value, status: u16) -> String {
    error_message(body).unwrap_or_else(|| match body {
        Value::Null => format!("HTTP {status}"),
        Value::String(s) if s.is_empty() => format!("HTTP {status}"),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_string_content() {
        let body = json!({"messages": [{"content": "hello"}]});
        assert_eq!(extract_canonical_text(&body).as_deref(), Some("hello"));
    }

    #[test]
    fn test_messages_uses_last_entry() {
        let body = json!({"messages": [
            {"role": "user", "content": "question"},
            {"role": "assistant", "content": "answer"}
        ]});
        assert_eq!(extract_canonical_text(&body).as_deref(), Some("answer"));
    }

    #[test]
    fn test_messages_list_content() {
        let body = json!({"messages": [{"content": [
            {"image": {"format": "jpeg"}},
            {"text": "from list"}
        ]}]});
        assert_eq!(extract_canonical_text(&body).as_deref(), Some("from list"));
    }

    #[test]
    fn test_messages_list_nested_content() {
        let body = json!({"messages": [{"content": [{"content": "nested"}]}]});
        assert_eq!(extract_canonical_text(&body).as_deref(), Some("nested"));
    }

    #[test]
    fn test_candidates_parts() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": "world"}]}}]});
        assert_eq!(extract_canonical_text(&body).as_deref(), Some("world"));
    }

    #[test]
    fn test_candidates_string_and_direct_text() {
        let body = json!({"candidates": [{"content": "plain"}]});
        assert_eq!(extract_canonical_text(&body).as_deref(), Some("plain"));

        let body = json!({"candidates": [{"content": {"text": "direct"}}]});
        assert_eq!(extract_canonical_text(&body).as_deref(), Some("direct"));
    }

    #[test]
    fn test_empty_messages_fall_through_to_candidates() {
        let body = json!({
            "messages": [{"content": ""}],
            "candidates": [{"content": "second shape"}]
        });
        assert_eq!(extract_canonical_text(&body).as_deref(), Some("second shape"));
    }

    #[test]
    fn test_unrecognized_shape() {
        assert_eq!(extract_canonical_text(&json!({"choices": []})), None);
        assert_eq!(extract_canonical_text(&json!({"messages": []})), None);
        assert_eq!(extract_canonical_text(&json!("just a string")), None);
    }

    #[test]
    fn test_description_field_priority() {
        let body = json!({"message": "last", "output": "middle"});
        assert_eq!(extract_description(&body), "middle");

        let body = json!({"description": {"text": "nested text"}});
        assert_eq!(extract_description(&body), "nested text");
    }

    #[test]
    fn test_description_falls_back_to_json() {
        let body = json!({"id": 7});
        let text = extract_description(&body);
        assert!(text.contains("\"id\": 7"));
    }

    #[test]
    fn test_error_message_variants() {
        let body = json!({"error": {"message": "Rate limit exceeded"}});
        assert_eq!(error_message(&body).as_deref(), Some("Rate limit exceeded"));

        let body = json!({
            "error": {"message": "Upstream failed"},
            "provider": {"error": {"message": "quota"}}
        });
        assert_eq!(
            error_message(&body).as_deref(),
            Some("Upstream failed | Provider error: quota")
        );

        let body = json!({"Message": "AccessDenied"});
        assert_eq!(error_message(&body).as_deref(), Some("AccessDenied"));

        assert_eq!(error_message(&json!({"ok": true})), None);
    }

    #[test]
    fn test_error_message_or_body() {
        assert_eq!(error_message_or_body(&Value::Null, 502), "HTTP 502");
        assert_eq!(
            error_message_or_body(&json!("gateway down"), 502),
            "gateway down"
        );
        assert_eq!(error_message_or_body(&json!({"a": 1}), 500), "{\"a\":1}");
    }
}
