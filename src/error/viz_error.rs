//! Unified error type for vizchat.
//!
//! `VizError` gathers the transport, API and stream errors behind a
//! single type so front-ends can categorize and report them uniformly.

use std::fmt;

use super::category::ErrorCategory;
use super::stream::StreamError;
use crate::client::ClientError;
use crate::traits::HttpError;

/// Unified error type for vizchat.
#[derive(Debug)]
pub enum VizError {
    /// The request never got a response.
    Network(HttpError),

    /// The backend answered with a non-2xx status.
    Server { status: u16, message: String },

    /// A response body did not have the expected shape.
    InvalidResponse(String),

    /// A chat stream ended in failure.
    Stream(StreamError),

    /// Invalid configuration.
    Config(String),
}

impl VizError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            VizError::Network(HttpError::InvalidUrl(_)) => ErrorCategory::Configuration,
            VizError::Network(HttpError::Cancelled) => ErrorCategory::User,
            VizError::Network(_) => ErrorCategory::Network,
            VizError::Server { status, .. } if *status < 500 => ErrorCategory::User,
            VizError::Server { .. } => ErrorCategory::Server,
            VizError::InvalidResponse(_) => ErrorCategory::Client,
            VizError::Stream(err) => match err {
                StreamError::ConnectionLost { .. }
                | StreamError::EndedUnexpectedly
                | StreamError::OpenFailed { status: None, .. } => ErrorCategory::Network,
                StreamError::OpenFailed {
                    status: Some(status),
                    ..
                } if *status < 500 => ErrorCategory::User,
                StreamError::OpenFailed { .. } | StreamError::BackendError { .. } => {
                    ErrorCategory::Server
                }
                StreamError::Cancelled => ErrorCategory::User,
            },
            VizError::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            VizError::Network(HttpError::InvalidUrl(_) | HttpError::Cancelled) => false,
            VizError::Network(_) => true,
            VizError::Server { status, .. } => *status >= 500 || *status == 429,
            VizError::Stream(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            VizError::Network(HttpError::Timeout(_)) => {
                "The server did not respond in time.".to_string()
            }
            VizError::Network(HttpError::ConnectionFailed(_)) => {
                "Unable to connect to the server. Is the backend running?".to_string()
            }
            VizError::Network(err) => format!("Network error: {}", err),
            VizError::Server { status, message } => match *status {
                404 => format!("Not found: {}", message),
                500..=599 => format!("The server is experiencing issues: {}", message),
                _ => message.clone(),
            },
            VizError::InvalidResponse(_) => {
                "Received an invalid response from the server.".to_string()
            }
            VizError::Stream(err) => err.user_message(),
            VizError::Config(message) => format!("Configuration error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            VizError::Network(HttpError::Timeout(_)) => "E_NET_TIMEOUT",
            VizError::Network(HttpError::ConnectionFailed(_)) => "E_NET_CONN",
            VizError::Network(HttpError::InvalidUrl(_)) => "E_NET_URL",
            VizError::Network(HttpError::Cancelled) => "E_NET_CANCEL",
            VizError::Network(_) => "E_NET_OTHER",
            VizError::Server { .. } => "E_NET_HTTP",
            VizError::InvalidResponse(_) => "E_NET_INVALID",
            VizError::Stream(err) => err.error_code(),
            VizError::Config(_) => "E_CONFIG",
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for VizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VizError::Network(err) => write!(f, "{}", err),
            VizError::Server { status, message } => write!(f, "HTTP {} error: {}", status, message),
            VizError::InvalidResponse(message) => write!(f, "Invalid response: {}", message),
            VizError::Stream(err) => write!(f, "{}", err),
            VizError::Config(message) => write!(f, "Configuration error: {}", message),
        }
    }
}

impl std::error::Error for VizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VizError::Network(err) => Some(err),
            VizError::Stream(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HttpError> for VizError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => VizError::Server { status, message },
            other => VizError::Network(other),
        }
    }
}

impl From<ClientError> for VizError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(err) => err.into(),
            ClientError::Json(err) => VizError::InvalidResponse(err.to_string()),
            ClientError::ServerError { status, message } => VizError::Server { status, message },
        }
    }
}

impl From<StreamError> for VizError {
    fn from(err: StreamError) -> Self {
        VizError::Stream(err)
    }
}

impl From<serde_json::Error> for VizError {
    fn from(err: serde_json::Error) -> Self {
        VizError::InvalidResponse(err.to_string())
    }
}
