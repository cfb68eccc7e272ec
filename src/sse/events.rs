//! SSE frame and event type definitions
//!
//! `SseFrame` is the raw `(event_type, payload)` pair the frame parser
//! produces. `ChatEvent` is the typed event the reconciler consumes.

use serde::{Deserialize, Serialize};

/// One `event:`/`data:` pair extracted from the raw stream text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` line, trimmed
    pub event_type: String,
    /// Rest of the `data:` line, unparsed
    pub payload: String,
}

impl SseFrame {
    pub fn new(event_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: payload.into(),
        }
    }
}

/// Typed events from the chat streaming API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Full, cumulative assistant text so far (not a delta)
    Message { content: String },
    /// A complete chart descriptor, forwarded verbatim
    Chart { spec: serde_json::Value },
    /// Stream completed; carries the server-assigned assistant message id
    Done { final_id: String },
    /// Terminal failure reported by the server
    Error { reason: String },
}

impl ChatEvent {
    /// Returns the wire event type name.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            ChatEvent::Message { .. } => "message",
            ChatEvent::Chart { .. } => "chart",
            ChatEvent::Done { .. } => "done",
            ChatEvent::Error { .. } => "error",
        }
    }

    /// True for `done` and `error`, which end the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::Done { .. } | ChatEvent::Error { .. })
    }
}

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration (e.g., "event: message")
    Event(String),
    /// Data payload (e.g., "data: {\"content\": \"hello\"}")
    Data(String),
    /// Anything else: blank lines, comments, unknown fields
    Ignored,
}

/// Reasons a frame could not be turned into a `ChatEvent`
#[derive(Debug, Clone, PartialEq)]
pub enum SseParseError {
    /// Event type outside message/chart/done/error
    UnknownEventType(String),
    /// Payload is not valid JSON
    InvalidJson { event_type: String, source: String },
    /// Payload parsed but a required field is absent or mistyped
    MissingField {
        event_type: String,
        field: &'static str,
    },
}

impl std::fmt::Display for SseParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SseParseError::UnknownEventType(t) => write!(f, "Unknown SSE event type: {}", t),
            SseParseError::InvalidJson { event_type, source } => {
                write!(f, "Invalid JSON for event '{}': {}", event_type, source)
            }
            SseParseError::MissingField { event_type, field } => {
                write!(f, "Missing field '{}' for event type: {}", field, event_type)
            }
        }
    }
}

impl std::error::Error for SseParseError {}
