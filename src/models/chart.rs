use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chart produced by an assistant reply.
///
/// `spec` is an opaque visualization descriptor, forwarded verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chart {
    pub id: String,
    /// Message this chart belongs to (rewritten when that message is promoted)
    pub message_id: String,
    pub session_id: String,
    pub spec: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Chart {
    /// New chart with a freshly generated id.
    pub fn new(session_id: &str, message_id: &str, spec: serde_json::Value) -> Self {
        Self {
            id: format!("chart-{}", Uuid::new_v4()),
            message_id: message_id.to_string(),
            session_id: session_id.to_string(),
            spec,
            created_at: Utc::now(),
        }
    }
}
