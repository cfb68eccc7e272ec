//! Session API client for the chart-chat backend.
//!
//! Covers session CRUD and opening the chat stream. All requests go through an
//! injectable [`HttpClient`], so tests run against [`MockHttpClient`].
//!
//! [`MockHttpClient`]: crate::adapters::MockHttpClient

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::models::{RenameRequest, Session, SessionDetail, SessionListResponse, StreamRequest};
use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// Title the backend gives a session created without one.
pub const DEFAULT_SESSION_TITLE: &str = "新对话";

/// Error type for session API operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be completed
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// The response body did not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server returned a non-2xx status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
}

impl ClientError {
    /// True if the backend reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::ServerError { status: 404, .. })
    }
}

/// Client for the session and chat endpoints.
#[derive(Clone)]
pub struct ChatClient {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a client backed by reqwest.
    pub fn new(config: ClientConfig) -> Self {
        let http = ReqwestHttpClient::new().with_request_timeout(config.request_timeout);
        Self::with_http_client(config, Arc::new(http))
    }

    /// Create a client over any [`HttpClient`].
    pub fn with_http_client(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn json_headers() -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    fn check(response: Response) -> Result<Response, ClientError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(ClientError::ServerError {
                status: response.status,
                message: response.error_message(),
            })
        }
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        Ok(Self::check(response)?.json()?)
    }

    /// `POST /sessions?title=...`
    pub async fn create_session(&self, title: Option<&str>) -> Result<Session, ClientError> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_SESSION_TITLE);
        let url = format!(
            "{}?title={}",
            self.config.sessions_url(),
            urlencoding::encode(title)
        );
        debug!(title, "Creating session");
        let response = self.http.post(&url, "", &Headers::new()).await?;
        Self::decode(response)
    }

    /// `GET /sessions`
    pub async fn list_sessions(&self) -> Result<Vec<Session>, ClientError> {
        let response = self
            .http
            .get(&self.config.sessions_url(), &Headers::new())
            .await?;
        let list: SessionListResponse = Self::decode(response)?;
        Ok(list.sessions)
    }

    /// `GET /sessions/{id}`, including the persisted messages.
    pub async fn get_session(&self, session_id: &str) -> Result<SessionDetail, ClientError> {
        let response = self
            .http
            .get(&self.config.session_url(session_id), &Headers::new())
            .await?;
        Self::decode(response)
    }

    /// `PUT /sessions/{id}` with `{title}`.
    pub async fn rename_session(&self, session_id: &str, title: &str) -> Result<(), ClientError> {
        let body = serde_json::to_string(&RenameRequest {
            title: title.to_string(),
        })?;
        let response = self
            .http
            .put(
                &self.config.session_url(session_id),
                &body,
                &Self::json_headers(),
            )
            .await?;
        Self::check(response).map(|_| ())
    }

    /// `DELETE /sessions/{id}`
    pub async fn delete_session(&self, session_id: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(&self.config.session_url(session_id), &Headers::new())
            .await?;
        Self::check(response).map(|_| ())
    }

    /// `POST /chat/stream` and return the raw SSE body.
    ///
    /// A non-2xx status surfaces as [`HttpError::ServerError`] before any
    /// bytes are read.
    pub async fn open_stream(&self, session_id: &str, message: &str) -> Result<ByteStream, HttpError> {
        let body = serde_json::to_string(&StreamRequest::new(session_id, message))
            .map_err(|e| HttpError::Other(e.to_string()))?;
        let mut headers = Self::json_headers();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        debug!(session_id, "Opening chat stream");
        self.http
            .post_stream(&self.config.stream_url(), &body, &headers)
            .await
    }
}
