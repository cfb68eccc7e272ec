//! Transport driver for chat streams.
//!
//! Opens one streaming request per accepted message and pumps the body through
//! [`FrameParser`] and [`normalize`] into the [`SessionReconciler`], one chunk
//! at a time. Every way the stream can end leaves the reconciler idle.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::client::ChatClient;
use crate::error::{StreamError, VizError};
use crate::reconciler::{SessionReconciler, StreamHandle, StreamOutcome};
use crate::sse::{normalize, ChatEvent, FrameParser, SseFrame};
use crate::traits::ByteStream;

/// Aborts one in-flight stream from outside the read loop.
///
/// Single use: a handle arms exactly one accepted `send_cancellable` call.
/// A send the reconciler rejects leaves the handle armed.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    handle: AbortHandle,
    registration: Arc<Mutex<Option<AbortRegistration>>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (handle, registration) = AbortHandle::new_pair();
        Self {
            handle,
            registration: Arc::new(Mutex::new(Some(registration))),
        }
    }

    /// Abort the stream. The reconciler sees a transport failure.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_aborted()
    }

    fn take_registration(&self) -> Option<AbortRegistration> {
        self.registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Re-arm the handle after a send that never started.
    fn restore_registration(&self, registration: AbortRegistration) {
        *self
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(registration);
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives chat streams for a [`ChatClient`].
#[derive(Debug, Clone)]
pub struct StreamDriver {
    client: ChatClient,
}

impl StreamDriver {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    /// Send `text` in `session_id` and stream the reply to completion.
    ///
    /// Returns `None` if the reconciler rejected the message (a stream is
    /// already active or the text is blank). Otherwise returns the terminal
    /// outcome.
    pub async fn send(
        &self,
        reconciler: &mut SessionReconciler,
        session_id: &str,
        text: &str,
    ) -> Option<StreamOutcome> {
        self.send_with(reconciler, session_id, text, |_, _| {}).await
    }

    /// Like [`send`](Self::send), calling `observer` after every applied event.
    pub async fn send_with<F>(
        &self,
        reconciler: &mut SessionReconciler,
        session_id: &str,
        text: &str,
        mut observer: F,
    ) -> Option<StreamOutcome>
    where
        F: FnMut(&SessionReconciler, &ChatEvent),
    {
        let handle = reconciler.begin_stream(session_id, text)?;
        Some(self.run(reconciler, &handle, &mut observer).await)
    }

    /// Like [`send_with`](Self::send_with), abortable through `cancel`.
    ///
    /// An abort at any point, including while the request is still being
    /// opened, fails the stream with reason `"stream cancelled"`.
    pub async fn send_cancellable<F>(
        &self,
        reconciler: &mut SessionReconciler,
        session_id: &str,
        text: &str,
        cancel: &CancelHandle,
        mut observer: F,
    ) -> Option<StreamOutcome>
    where
        F: FnMut(&SessionReconciler, &ChatEvent),
    {
        let Some(registration) = cancel.take_registration() else {
            warn!(session_id, "Cancel handle already used; message not sent");
            return None;
        };
        let Some(handle) = reconciler.begin_stream(session_id, text) else {
            cancel.restore_registration(registration);
            return None;
        };

        let result = Abortable::new(self.run(reconciler, &handle, &mut observer), registration).await;

        match result {
            Ok(outcome) => Some(outcome),
            Err(_aborted) => {
                info!(session_id, "Stream cancelled");
                Some(Self::fail(reconciler, StreamError::Cancelled, &mut observer))
            }
        }
    }

    async fn run<F>(
        &self,
        reconciler: &mut SessionReconciler,
        handle: &StreamHandle,
        observer: &mut F,
    ) -> StreamOutcome
    where
        F: FnMut(&SessionReconciler, &ChatEvent),
    {
        match self.client.open_stream(&handle.session_id, &handle.text).await {
            Ok(stream) => Self::pump(stream, reconciler, observer).await,
            Err(err) => Self::fail(reconciler, StreamError::from_open_error(&err), observer),
        }
    }

    /// Read `stream` to its end, applying each chunk before reading the next.
    ///
    /// Stops at the first terminal event. A read error is a transport
    /// failure; a clean end without `done` or `error` fails the stream with
    /// `"stream ended unexpectedly"`.
    pub async fn pump<F>(
        mut stream: ByteStream,
        reconciler: &mut SessionReconciler,
        mut observer: F,
    ) -> StreamOutcome
    where
        F: FnMut(&SessionReconciler, &ChatEvent),
    {
        let mut parser = FrameParser::new();
        let mut chunks = 0usize;

        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    chunks += 1;
                    let frames = parser.feed_bytes(&chunk);
                    if let Some(outcome) = Self::dispatch(frames, reconciler, &mut observer) {
                        debug!(chunks, "Stream finished");
                        return outcome;
                    }
                }
                Err(err) => {
                    return Self::fail(reconciler, StreamError::from_read_error(&err), &mut observer);
                }
            }
        }

        let frames = parser.finish();
        if let Some(outcome) = Self::dispatch(frames, reconciler, &mut observer) {
            return outcome;
        }

        debug!(chunks, "Stream body ended without a terminal event");
        if reconciler.is_streaming() {
            Self::fail(reconciler, StreamError::EndedUnexpectedly, &mut observer)
        } else {
            StreamOutcome::Ignored
        }
    }

    /// Apply frames in order; returns the outcome of the first terminal one.
    fn dispatch<F>(
        frames: Vec<SseFrame>,
        reconciler: &mut SessionReconciler,
        observer: &mut F,
    ) -> Option<StreamOutcome>
    where
        F: FnMut(&SessionReconciler, &ChatEvent),
    {
        for frame in frames {
            let Some(event) = normalize(&frame) else {
                continue;
            };
            if let ChatEvent::Error { reason } = event {
                if reconciler.is_streaming() {
                    let error = StreamError::BackendError { message: reason };
                    return Some(Self::fail(reconciler, error, observer));
                }
                debug!("Ignoring error event: no active stream");
                continue;
            }
            let outcome = reconciler.apply(&event);
            if outcome != StreamOutcome::Ignored {
                observer(reconciler, &event);
            }
            if outcome.is_terminal() {
                return Some(outcome);
            }
        }
        None
    }

    fn fail<F>(reconciler: &mut SessionReconciler, error: StreamError, observer: &mut F) -> StreamOutcome
    where
        F: FnMut(&SessionReconciler, &ChatEvent),
    {
        if let Some(active) = reconciler.active_stream() {
            warn!(
                session_id = %active.session_id,
                code = error.error_code(),
                category = %VizError::Stream(error.clone()).category(),
                "{}",
                error
            );
        }
        let reason = error.user_message();
        let outcome = reconciler.on_transport_failure(&reason);
        if outcome != StreamOutcome::Ignored {
            observer(reconciler, &ChatEvent::Error { reason });
        }
        outcome
    }
}
