//! Session membership: which sessions exist, which is active, and their
//! persisted history.

use chrono::Utc;
use tracing::{debug, info};

use crate::models::{Chart, Session, ServerMessage};

use super::SessionReconciler;

impl SessionReconciler {
    /// All known sessions, most recent first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active_session_id.as_deref()
    }

    /// Replace the session list with what the server returned.
    ///
    /// The active session is kept if it is still listed.
    pub fn set_sessions(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
        if let Some(active) = self.active_session_id.as_deref() {
            if self.session(active).is_none() {
                self.active_session_id = None;
                self.current_chart_id = None;
            }
        }
    }

    /// Add a newly created session at the front and make it active.
    pub fn insert_session(&mut self, session: Session) {
        self.sessions.retain(|s| s.id != session.id);
        info!(session_id = %session.id, "Session added");
        self.active_session_id = Some(session.id.clone());
        self.current_chart_id = None;
        self.sessions.insert(0, session);
    }

    /// Make `session_id` active and show its first chart.
    ///
    /// A stream in flight elsewhere is left running.
    pub fn switch_session(&mut self, session_id: &str) -> bool {
        if self.session(session_id).is_none() {
            debug!(session_id, "Cannot switch to unknown session");
            return false;
        }
        self.active_session_id = Some(session_id.to_string());
        self.current_chart_id = self.charts(session_id).first().map(|c| c.id.clone());
        true
    }

    /// Update a session's title and bump `updated_at`.
    pub fn rename_session(&mut self, session_id: &str, title: &str) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == session_id) {
            Some(session) => {
                session.title = title.to_string();
                session.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Drop a session with all its messages and charts.
    ///
    /// If it was active, the first remaining session becomes active. A stream
    /// owned by the session keeps running; its later writes are dropped.
    pub fn remove_session(&mut self, session_id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != session_id);
        let removed_meta = self.sessions.len() < before;
        let removed = self.messages.remove(session_id);
        let removed_messages = removed.is_some();
        if let Some(messages) = removed {
            self.promoted
                .retain(|_, final_id| !messages.iter().any(|m| &m.id == final_id));
        }
        let removed_charts = self.charts.remove(session_id).is_some();

        if self.active_session_id.as_deref() == Some(session_id) {
            self.active_session_id = self.sessions.first().map(|s| s.id.clone());
            self.current_chart_id = None;
        }

        if self
            .active_stream()
            .is_some_and(|active| active.session_id == session_id)
        {
            self.chart_loading = false;
            info!(session_id, "Removed the session of the active stream");
        }

        removed_meta || removed_messages || removed_charts
    }

    /// Hydrate a session from its persisted history.
    ///
    /// Each assistant message with `chart_data` yields one chart. If a stream
    /// is in flight in this session, its local user message and placeholder
    /// are kept after the history.
    pub fn load_history(&mut self, session_id: &str, history: Vec<ServerMessage>) {
        let in_flight: Vec<String> = match self.active_stream() {
            Some(active) if active.session_id == session_id => vec![
                active.user_message_id.clone(),
                active.pending_message_id.clone(),
            ],
            _ => Vec::new(),
        };

        let mut messages = Vec::with_capacity(history.len() + in_flight.len());
        let mut charts = Vec::new();
        for server in &history {
            if let Some(spec) = &server.chart_data {
                if !spec.is_null() {
                    let mut chart = Chart::new(session_id, &server.id, spec.clone());
                    chart.created_at = server.created_at;
                    charts.push(chart);
                }
            }
            messages.push(server.to_client_message(session_id));
        }

        if let Some(existing) = self.messages.remove(session_id) {
            messages.extend(existing.into_iter().filter(|m| in_flight.contains(&m.id)));
        }
        if let Some(existing) = self.charts.remove(session_id) {
            charts.extend(
                existing
                    .into_iter()
                    .filter(|c| in_flight.contains(&c.message_id)),
            );
        }

        debug!(
            session_id,
            messages = messages.len(),
            charts = charts.len(),
            "History loaded"
        );

        if self.active_session_id.as_deref() == Some(session_id) {
            let current_still_here = self
                .current_chart_id
                .as_deref()
                .is_some_and(|id| charts.iter().any(|c| c.id == id));
            if !current_still_here {
                self.current_chart_id = charts.first().map(|c| c.id.clone());
            }
        }

        self.messages.insert(session_id.to_string(), messages);
        self.charts.insert(session_id.to_string(), charts);
    }
}
