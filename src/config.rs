//! Client configuration.
//!
//! The backend location comes from, in increasing precedence: the built-in
//! default, `VIZCHAT_API_URL`, and the `--api-url` flag.

use std::time::Duration;

use crate::error::VizError;

/// Default backend API root.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding the backend API root.
pub const API_URL_ENV: &str = "VIZCHAT_API_URL";

/// Configuration for the session API client and stream driver.
///
/// # Example
///
/// ```ignore
/// use vizchat::config::ClientConfig;
///
/// let config = ClientConfig::from_env()
///     .with_request_timeout(None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root, without a trailing slash
    pub base_url: String,
    /// Path of the streaming chat endpoint, relative to `base_url`
    pub stream_path: String,
    /// Timeout for the CRUD calls. The stream itself never times out.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_path: "/chat/stream".to_string(),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the streaming endpoint path.
    pub fn with_stream_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.stream_path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    /// Set the CRUD request timeout.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create config from `VIZCHAT_API_URL`, falling back to the default.
    pub fn from_env() -> Self {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::default().with_base_url(url.trim()),
            _ => Self::default(),
        }
    }

    /// Reject base URLs that reqwest could never reach.
    pub fn validate(&self) -> Result<(), VizError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(VizError::Config(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        Ok(())
    }

    /// `GET`/`POST` collection URL.
    pub fn sessions_url(&self) -> String {
        format!("{}/sessions", self.base_url)
    }

    /// URL of one session.
    pub fn session_url(&self, session_id: &str) -> String {
        format!(
            "{}/sessions/{}",
            self.base_url,
            urlencoding::encode(session_id)
        )
    }

    /// URL of the streaming chat endpoint.
    pub fn stream_url(&self) -> String {
        format!("{}{}", self.base_url, self.stream_path)
    }
}
