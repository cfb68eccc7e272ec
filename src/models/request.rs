use serde::{Deserialize, Serialize};

/// Body of `POST /chat/stream`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamRequest {
    pub session_id: String,
    pub message: String,
}

impl StreamRequest {
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            message: message.into(),
        }
    }
}

/// Body of `PUT /sessions/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenameRequest {
    pub title: String,
}
