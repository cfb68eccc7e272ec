//! Frame → typed event normalization.
//!
//! Malformed frames never abort a stream: `normalize` logs why a frame was
//! dropped and returns `None`. Unknown event types are dropped the same way,
//! which keeps older clients working against newer servers.

use crate::sse::events::{ChatEvent, SseFrame, SseParseError};
use crate::sse::payloads::{ChartPayload, DonePayload, ErrorPayload, MessagePayload};

/// Normalize a frame into a `ChatEvent`, dropping anything unrecognized.
pub fn normalize(frame: &SseFrame) -> Option<ChatEvent> {
    match parse_chat_event(&frame.event_type, &frame.payload) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::debug!(event_type = %frame.event_type, error = %err, "dropping SSE frame");
            None
        }
    }
}

/// Parse an event type and JSON payload into a `ChatEvent`.
pub fn parse_chat_event(event_type: &str, payload: &str) -> Result<ChatEvent, SseParseError> {
    match event_type {
        "message" => {
            let p: MessagePayload = parse_json(event_type, payload)?;
            let content = p.content.ok_or_else(|| missing(event_type, "content"))?;
            Ok(ChatEvent::Message { content })
        }
        "chart" => {
            let p: ChartPayload = parse_json(event_type, payload)?;
            let spec = p.option.ok_or_else(|| missing(event_type, "option"))?;
            Ok(ChatEvent::Chart { spec })
        }
        "done" => {
            let p: DonePayload = parse_json(event_type, payload)?;
            let final_id = p
                .message_id
                .map(|id| id.into_string())
                .ok_or_else(|| missing(event_type, "message_id"))?;
            Ok(ChatEvent::Done { final_id })
        }
        "error" => {
            let p: ErrorPayload = parse_json(event_type, payload)?;
            let reason = p.error.ok_or_else(|| missing(event_type, "error"))?;
            Ok(ChatEvent::Error { reason })
        }
        other => Err(SseParseError::UnknownEventType(other.to_string())),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(
    event_type: &str,
    payload: &str,
) -> Result<T, SseParseError> {
    serde_json::from_str(payload).map_err(|e| SseParseError::InvalidJson {
        event_type: event_type.to_string(),
        source: e.to_string(),
    })
}

fn missing(event_type: &str, field: &'static str) -> SseParseError {
    SseParseError::MissingField {
        event_type: event_type.to_string(),
        field,
    }
}
