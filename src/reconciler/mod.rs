//! Session reconciler
//!
//! Owns the client-side conversation state: sessions, their messages and
//! charts, and the single in-flight stream. Stream events are applied here
//! with optimistic placeholders, id promotion and rollback.

mod error;
mod reconciliation;
mod session;
mod stream;

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{Chart, Message, Session};

/// An in-flight stream. Exists only while the reconciler is streaming.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveStream {
    pub session_id: String,
    pub user_message_id: String,
    /// Temporary id of the assistant placeholder
    pub pending_message_id: String,
    pub started_at: DateTime<Utc>,
}

/// Stream lifecycle. `Completed` and `Failed` are reported through
/// [`StreamOutcome`] and never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StreamState {
    #[default]
    Idle,
    Streaming(ActiveStream),
}

/// Returned by a successful `begin_stream`; tells the driver what to send.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamHandle {
    pub session_id: String,
    /// The trimmed text, as stored in the user message
    pub text: String,
    pub user_message_id: String,
    pub pending_message_id: String,
}

/// Result of applying one event or failure.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    /// Still streaming
    Continuing,
    /// `done` arrived; the placeholder now carries `message_id`
    Completed { message_id: String },
    /// The stream failed and the placeholder was rolled back
    Failed { reason: String },
    /// Nothing was streaming
    Ignored,
}

impl StreamOutcome {
    /// True for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamOutcome::Completed { .. } | StreamOutcome::Failed { .. }
        )
    }
}

/// Read-only view of one session for rendering.
///
/// `is_streaming`, `chart_loading` and `error` are global: they describe the
/// single stream and the single error surface, whichever session owns them.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub messages: Vec<Message>,
    pub charts: Vec<Chart>,
    pub is_streaming: bool,
    pub chart_loading: bool,
    pub error: Option<String>,
    pub current_chart_id: Option<String>,
}

/// In-memory conversation state for every known session.
#[derive(Debug, Default)]
pub struct SessionReconciler {
    /// Session metadata, most recent first
    pub(crate) sessions: Vec<Session>,
    pub(crate) active_session_id: Option<String>,
    /// Messages per session id, in insertion order
    pub(crate) messages: HashMap<String, Vec<Message>>,
    /// Charts per session id, in insertion order
    pub(crate) charts: HashMap<String, Vec<Chart>>,
    /// Chart shown in the chart panel
    pub(crate) current_chart_id: Option<String>,
    /// Temporary message id -> permanent id, recorded on promotion
    pub(crate) promoted: HashMap<String, String>,
    pub(crate) state: StreamState,
    pub(crate) chart_loading: bool,
    pub(crate) error: Option<String>,
}

impl SessionReconciler {
    /// Create an empty reconciler.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a stream is in flight.
    pub fn is_streaming(&self) -> bool {
        matches!(self.state, StreamState::Streaming(_))
    }

    /// The in-flight stream, if any.
    pub fn active_stream(&self) -> Option<&ActiveStream> {
        match &self.state {
            StreamState::Streaming(active) => Some(active),
            StreamState::Idle => None,
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn chart_loading(&self) -> bool {
        self.chart_loading
    }

    /// Messages of a session (empty if unknown).
    pub fn messages(&self, session_id: &str) -> &[Message] {
        self.messages
            .get(session_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Charts of a session (empty if unknown).
    pub fn charts(&self, session_id: &str) -> &[Chart] {
        self.charts
            .get(session_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn current_chart_id(&self) -> Option<&str> {
        self.current_chart_id.as_deref()
    }

    /// Point the chart panel at `chart_id`, or clear it with `None`.
    ///
    /// Returns false if no session has a chart with that id.
    pub fn select_chart(&mut self, chart_id: Option<&str>) -> bool {
        match chart_id {
            None => {
                self.current_chart_id = None;
                true
            }
            Some(id) => {
                let exists = self.charts.values().flatten().any(|c| c.id == id);
                if exists {
                    self.current_chart_id = Some(id.to_string());
                }
                exists
            }
        }
    }

    /// Read-only view of `session_id` for rendering.
    pub fn snapshot(&self, session_id: &str) -> SessionSnapshot {
        SessionSnapshot {
            session_id: session_id.to_string(),
            messages: self.messages(session_id).to_vec(),
            charts: self.charts(session_id).to_vec(),
            is_streaming: self.is_streaming(),
            chart_loading: self.chart_loading,
            error: self.error.clone(),
            current_chart_id: self.current_chart_id.clone(),
        }
    }
}
