//! Message id promotion.

use super::{ActiveStream, SessionReconciler};

impl SessionReconciler {
    /// Resolve a message id, following temporary->permanent promotions.
    ///
    /// Lets a caller that captured the placeholder id (for example from a
    /// [`StreamHandle`](super::StreamHandle)) find the message after `done`.
    pub fn resolve_message_id<'a>(&'a self, message_id: &'a str) -> &'a str {
        self.promoted
            .get(message_id)
            .map(|s| s.as_str())
            .unwrap_or(message_id)
    }

    /// Rewrite the placeholder id to `final_id` along with every chart that
    /// points at it. Returns false if the placeholder no longer exists.
    pub(crate) fn promote(&mut self, active: &ActiveStream, final_id: &str) -> bool {
        let pending_id = active.pending_message_id.as_str();

        let found = match self
            .messages
            .get_mut(&active.session_id)
            .and_then(|list| list.iter_mut().find(|m| m.id == pending_id))
        {
            Some(message) => {
                message.promote(final_id);
                true
            }
            None => false,
        };

        if let Some(charts) = self.charts.get_mut(&active.session_id) {
            for chart in charts.iter_mut().filter(|c| c.message_id == pending_id) {
                chart.message_id = final_id.to_string();
            }
        }

        if pending_id != final_id {
            self.promoted
                .insert(pending_id.to_string(), final_id.to_string());
        }
        found
    }
}
