//! Plain-text rendering of sessions, history and live streams.

use crate::models::{Message, MessageRole, Session};
use crate::reconciler::{SessionReconciler, SessionSnapshot};
use crate::sse::ChatEvent;

/// One line of `vizchat sessions`.
pub fn format_session_line(session: &Session) -> String {
    format!(
        "{}  {}  (updated {})",
        session.id,
        session.title,
        session.updated_at.format("%Y-%m-%d %H:%M")
    )
}

fn role_label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "you",
        MessageRole::Assistant => "assistant",
    }
}

/// Render a message with its role, indenting continuation lines.
pub fn format_message(message: &Message) -> String {
    let body = message.content.replace('\n', "\n    ");
    if message.is_pending {
        format!("[{}] …", role_label(message.role))
    } else {
        format!("[{}] {}", role_label(message.role), body)
    }
}

/// Render a whole snapshot: messages, each followed by its charts.
pub fn format_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = Vec::new();
    for message in &snapshot.messages {
        out.push(format_message(message));
        for chart in snapshot.charts.iter().filter(|c| c.message_id == message.id) {
            out.push(format_chart(&chart.id, &chart.spec));
        }
    }
    if let Some(error) = &snapshot.error {
        out.push(format!("error: {}", error));
    }
    out.join("\n")
}

fn format_chart(chart_id: &str, spec: &serde_json::Value) -> String {
    let pretty = serde_json::to_string_pretty(spec).unwrap_or_else(|_| spec.to_string());
    format!("  <chart {}>\n{}", chart_id, indent(&pretty, "    "))
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turns cumulative `message` events into incremental terminal output.
///
/// Each `message` event carries the full reply so far. When it extends what
/// was already printed only the new suffix is written; otherwise the reply is
/// reprinted on a fresh line.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    printed: String,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to write for `event`, given the state after it was applied.
    pub fn render(&mut self, reconciler: &SessionReconciler, event: &ChatEvent) -> String {
        match event {
            ChatEvent::Message { content } => {
                if let Some(delta) = content.strip_prefix(self.printed.as_str()) {
                    let delta = delta.to_string();
                    self.printed = content.clone();
                    delta
                } else {
                    self.printed = content.clone();
                    format!("\n{}", content)
                }
            }
            ChatEvent::Chart { spec } => {
                let chart_id = reconciler
                    .active_stream()
                    .and_then(|active| reconciler.charts(&active.session_id).last())
                    .map(|c| c.id.clone())
                    .unwrap_or_default();
                format!("\n{}\n", format_chart(&chart_id, spec))
            }
            ChatEvent::Done { final_id } => format!("\n[saved as {}]\n", final_id),
            ChatEvent::Error { reason } => format!("\n[failed: {}]\n", reason),
        }
    }
}
