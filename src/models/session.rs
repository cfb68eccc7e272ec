use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    deserialize_id, deserialize_nullable_string, deserialize_optional_timestamp,
    deserialize_timestamp, ServerMessage,
};

/// A conversation session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawSession")]
pub struct Session {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Wire shape of a session. The create endpoint omits `updated_at`.
#[derive(Deserialize)]
struct RawSession {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    title: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<RawSession> for Session {
    fn from(raw: RawSession) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            created_at: raw.created_at,
            updated_at: raw.updated_at.unwrap_or(raw.created_at),
        }
    }
}

/// Response from `GET /sessions`
#[derive(Debug, Clone, Deserialize)]
pub struct SessionListResponse {
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// Response from `GET /sessions/{id}`: the session plus its history
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: Session,
    #[serde(default)]
    pub messages: Vec<ServerMessage>,
}
