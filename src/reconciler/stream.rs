//! Stream lifecycle: begin, apply events, fail.

use tracing::{debug, info, warn};

use crate::models::{Chart, Message};
use crate::sse::ChatEvent;

use super::{ActiveStream, SessionReconciler, StreamHandle, StreamOutcome, StreamState};

impl SessionReconciler {
    /// Start a stream in `session_id` for `user_text`.
    ///
    /// Appends the user message and an empty pending assistant placeholder,
    /// both with temporary ids. Returns `None` without touching any state if
    /// a stream is already active or the trimmed text is empty.
    pub fn begin_stream(&mut self, session_id: &str, user_text: &str) -> Option<StreamHandle> {
        if let Some(active) = self.active_stream() {
            debug!(
                session_id,
                active_session_id = %active.session_id,
                "Rejected begin_stream: a stream is already active"
            );
            return None;
        }

        let text = user_text.trim();
        if text.is_empty() {
            debug!(session_id, "Rejected begin_stream: empty message");
            return None;
        }

        let user = Message::user(session_id, text.to_string());
        let placeholder = Message::pending_assistant(session_id);

        let handle = StreamHandle {
            session_id: session_id.to_string(),
            text: text.to_string(),
            user_message_id: user.id.clone(),
            pending_message_id: placeholder.id.clone(),
        };

        let list = self.messages.entry(session_id.to_string()).or_default();
        list.push(user);
        list.push(placeholder);

        self.state = StreamState::Streaming(ActiveStream {
            session_id: handle.session_id.clone(),
            user_message_id: handle.user_message_id.clone(),
            pending_message_id: handle.pending_message_id.clone(),
            started_at: chrono::Utc::now(),
        });

        info!(
            session_id,
            message_id = %handle.pending_message_id,
            "Stream started"
        );
        Some(handle)
    }

    /// Apply one normalized event to the in-flight stream.
    pub fn apply(&mut self, event: &ChatEvent) -> StreamOutcome {
        let active = match &self.state {
            StreamState::Streaming(active) => active.clone(),
            StreamState::Idle => {
                debug!(event = event.event_type_name(), "Ignoring event: no active stream");
                return StreamOutcome::Ignored;
            }
        };

        match event {
            ChatEvent::Message { content } => {
                match self.placeholder_mut(&active) {
                    Some(placeholder) => placeholder.replace_content(content),
                    None => warn!(
                        session_id = %active.session_id,
                        "Dropping message event: placeholder no longer exists"
                    ),
                }
                StreamOutcome::Continuing
            }
            ChatEvent::Chart { spec } => {
                self.append_chart(&active, spec.clone());
                StreamOutcome::Continuing
            }
            ChatEvent::Done { final_id } => self.complete(&active, final_id),
            ChatEvent::Error { reason } => self.fail(&active, reason),
        }
    }

    /// Report a transport failure. Equivalent to an `error` event while
    /// streaming; ignored otherwise.
    pub fn on_transport_failure(&mut self, reason: &str) -> StreamOutcome {
        match &self.state {
            StreamState::Streaming(active) => {
                let active = active.clone();
                self.fail(&active, reason)
            }
            StreamState::Idle => {
                debug!(reason, "Ignoring transport failure: no active stream");
                StreamOutcome::Ignored
            }
        }
    }

    fn placeholder_mut(&mut self, active: &ActiveStream) -> Option<&mut Message> {
        self.messages
            .get_mut(&active.session_id)?
            .iter_mut()
            .find(|m| m.id == active.pending_message_id)
    }

    fn append_chart(&mut self, active: &ActiveStream, spec: serde_json::Value) {
        if self.placeholder_mut(active).is_none() {
            warn!(
                session_id = %active.session_id,
                "Dropping chart event: placeholder no longer exists"
            );
            return;
        }

        let chart = Chart::new(&active.session_id, &active.pending_message_id, spec);
        debug!(session_id = %active.session_id, chart_id = %chart.id, "Chart appended");

        if self.active_session_id.as_deref() == Some(active.session_id.as_str()) {
            self.current_chart_id = Some(chart.id.clone());
        }
        self.charts
            .entry(active.session_id.clone())
            .or_default()
            .push(chart);
        self.chart_loading = true;
    }

    /// Finalize the placeholder under `final_id`.
    ///
    /// A blank `final_id` keeps the temporary id so the finished reply is not
    /// lost.
    fn complete(&mut self, active: &ActiveStream, final_id: &str) -> StreamOutcome {
        let final_id = if final_id.trim().is_empty() {
            warn!(
                session_id = %active.session_id,
                message_id = %active.pending_message_id,
                "Done without a message id; keeping the temporary id"
            );
            active.pending_message_id.as_str()
        } else {
            final_id
        };

        if !self.promote(active, final_id) {
            warn!(
                session_id = %active.session_id,
                message_id = final_id,
                "Stream completed but its placeholder was already removed"
            );
        }
        self.chart_loading = false;
        self.state = StreamState::Idle;

        info!(session_id = %active.session_id, message_id = final_id, "Stream completed");
        StreamOutcome::Completed {
            message_id: final_id.to_string(),
        }
    }

    /// Roll back the placeholder and surface `reason`.
    fn fail(&mut self, active: &ActiveStream, reason: &str) -> StreamOutcome {
        if let Some(list) = self.messages.get_mut(&active.session_id) {
            list.retain(|m| m.id != active.pending_message_id);
        }
        self.chart_loading = false;
        self.error = Some(reason.to_string());
        self.state = StreamState::Idle;

        warn!(
            session_id = %active.session_id,
            message_id = %active.pending_message_id,
            reason,
            "Stream failed, placeholder rolled back"
        );
        StreamOutcome::Failed {
            reason: reason.to_string(),
        }
    }
}
