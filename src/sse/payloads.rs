//! SSE payload deserialization structs
//!
//! Internal structs used to deserialize the JSON `data:` payloads of the
//! chat stream. Every field is optional so that a missing field surfaces as
//! `SseParseError::MissingField` instead of a generic JSON error.

use serde::Deserialize;

/// `message` payload: `{"content": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessagePayload {
    #[serde(default)]
    pub content: Option<String>,
}

/// `chart` payload: `{"option": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChartPayload {
    #[serde(default)]
    pub option: Option<serde_json::Value>,
}

/// `done` payload: `{"message_id": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DonePayload {
    #[serde(default)]
    pub message_id: Option<MessageIdValue>,
}

/// Message ids are strings on the wire, but integer ids are tolerated.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum MessageIdValue {
    Text(String),
    Number(i64),
}

impl MessageIdValue {
    pub fn into_string(self) -> String {
        match self {
            MessageIdValue::Text(s) => s,
            MessageIdValue::Number(n) => n.to_string(),
        }
    }
}

/// `error` payload: `{"error": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default)]
    pub error: Option<String>,
}
