use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{deserialize_id, deserialize_nullable_string, deserialize_timestamp};

/// Prefix for client-generated message ids awaiting promotion
pub const TEMP_ID_PREFIX: &str = "tmp-";

/// Generate a temporary client-side message id.
pub fn temp_message_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4())
}

/// True if `id` was generated locally and has not been promoted.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A message in a session's conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Temporary `tmp-` id until promoted, then the server id
    pub id: String,
    pub session_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Set only on the assistant placeholder of an in-flight stream
    #[serde(default)]
    pub is_pending: bool,
}

impl Message {
    /// Optimistic user message with a temporary id.
    pub fn user(session_id: &str, content: String) -> Self {
        Self {
            id: temp_message_id(),
            session_id: session_id.to_string(),
            role: MessageRole::User,
            content,
            created_at: Utc::now(),
            is_pending: false,
        }
    }

    /// Empty assistant placeholder with a temporary id.
    pub fn pending_assistant(session_id: &str) -> Self {
        Self {
            id: temp_message_id(),
            session_id: session_id.to_string(),
            role: MessageRole::Assistant,
            content: String::new(),
            created_at: Utc::now(),
            is_pending: true,
        }
    }

    /// Replace the placeholder content wholesale.
    pub fn replace_content(&mut self, content: &str) {
        if self.content != content {
            self.content.clear();
            self.content.push_str(content);
        }
    }

    /// Promote to a permanent id and finalize.
    pub fn promote(&mut self, final_id: &str) {
        self.id = final_id.to_string();
        self.is_pending = false;
    }
}

/// Persisted message as returned with a session's history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerMessage {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub role: MessageRole,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub content: String,
    /// Chart descriptor attached to an assistant reply
    #[serde(default)]
    pub chart_data: Option<serde_json::Value>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ServerMessage {
    /// Convert to a client message belonging to `session_id`.
    pub fn to_client_message(&self, session_id: &str) -> Message {
        Message {
            id: self.id.clone(),
            session_id: session_id.to_string(),
            role: self.role,
            content: self.content.clone(),
            created_at: self.created_at,
            is_pending: false,
        }
    }
}
