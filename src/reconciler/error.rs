//! The single-valued error surface.

use tracing::debug;

use super::SessionReconciler;

impl SessionReconciler {
    /// The latest error, if any. Errors never expire on their own.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the current error.
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(error = %message, "Error surfaced");
        self.error = Some(message);
    }

    /// Clear the current error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
