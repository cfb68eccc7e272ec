//! Errors that end a chat stream.
//!
//! Every variant eventually reaches the reconciler as a failure reason, so
//! [`StreamError::user_message`] is the text the user sees in the error
//! surface.

use std::fmt;

use crate::traits::HttpError;

/// Reason shown when the body ends before `done` or `error`.
pub const ENDED_UNEXPECTEDLY: &str = "stream ended unexpectedly";

/// Reason shown when the user aborts an in-flight stream.
pub const CANCELLED: &str = "stream cancelled";

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The stream request could not be opened.
    OpenFailed {
        status: Option<u16>,
        message: String,
    },

    /// Reading the body failed part-way through.
    ConnectionLost { message: String },

    /// The body ended without a terminal event.
    EndedUnexpectedly,

    /// The stream was aborted locally.
    Cancelled,

    /// The backend sent an `error` event.
    BackendError { message: String },
}

impl StreamError {
    /// Map a failure to open the stream.
    pub fn from_open_error(err: &HttpError) -> Self {
        match err {
            HttpError::Cancelled => StreamError::Cancelled,
            HttpError::ServerError { status, message } => StreamError::OpenFailed {
                status: Some(*status),
                message: message.clone(),
            },
            other => StreamError::OpenFailed {
                status: None,
                message: other.to_string(),
            },
        }
    }

    /// Map a failure while reading the body.
    pub fn from_read_error(err: &HttpError) -> Self {
        match err {
            HttpError::Cancelled => StreamError::Cancelled,
            other => StreamError::ConnectionLost {
                message: other.to_string(),
            },
        }
    }

    /// Check if this error is likely transient and the message can be resent.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::OpenFailed { status, .. } => {
                status.map_or(true, |s| s >= 500 || s == 429 || s == 408)
            }
            StreamError::ConnectionLost { .. } | StreamError::EndedUnexpectedly => true,
            StreamError::Cancelled | StreamError::BackendError { .. } => false,
        }
    }

    /// The failure reason recorded in the conversation error surface.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::OpenFailed {
                status: Some(_),
                message,
            } => message.clone(),
            StreamError::OpenFailed {
                status: None,
                message,
            } => format!("could not reach the server: {}", message),
            StreamError::ConnectionLost { message } => {
                format!("connection lost: {}", message)
            }
            StreamError::EndedUnexpectedly => ENDED_UNEXPECTEDLY.to_string(),
            StreamError::Cancelled => CANCELLED.to_string(),
            StreamError::BackendError { message } => message.clone(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::OpenFailed { .. } => "E_STREAM_OPEN",
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::EndedUnexpectedly => "E_STREAM_EOF",
            StreamError::Cancelled => "E_STREAM_CANCEL",
            StreamError::BackendError { .. } => "E_STREAM_BACKEND",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::OpenFailed {
                status: Some(status),
                message,
            } => write!(f, "Failed to open stream (HTTP {}): {}", status, message),
            StreamError::OpenFailed {
                status: None,
                message,
            } => write!(f, "Failed to open stream: {}", message),
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
            StreamError::EndedUnexpectedly => write!(f, "Stream ended before done"),
            StreamError::Cancelled => write!(f, "Stream cancelled"),
            StreamError::BackendError { message } => write!(f, "Backend error: {}", message),
        }
    }
}

impl std::error::Error for StreamError {}
