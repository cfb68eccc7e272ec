//! Handlers for the session and chat commands.

use std::io::Write;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::debug;

use crate::client::ChatClient;
use crate::driver::{CancelHandle, StreamDriver};
use crate::error::VizError;
use crate::reconciler::{SessionReconciler, StreamOutcome};

use super::render::{format_session_line, format_snapshot, StreamPrinter};

/// Turn any library error into a report carrying the user message and hint.
fn report(err: impl Into<VizError>) -> color_eyre::Report {
    let err = err.into();
    debug!(code = err.error_code(), category = %err.category(), "{}", err);
    eyre!("{}\nhint: {}", err.user_message(), err.recovery_hint())
}

pub async fn handle_sessions_command(client: &ChatClient) -> Result<()> {
    let sessions = client.list_sessions().await.map_err(report)?;
    if sessions.is_empty() {
        println!("no sessions yet; create one with `vizchat new`");
    }
    for session in &sessions {
        println!("{}", format_session_line(session));
    }
    Ok(())
}

pub async fn handle_new_command(client: &ChatClient, title: Option<&str>) -> Result<()> {
    let session = client.create_session(title).await.map_err(report)?;
    println!("{}", format_session_line(&session));
    Ok(())
}

pub async fn handle_rename_command(client: &ChatClient, session_id: &str, title: &str) -> Result<()> {
    client
        .rename_session(session_id, title)
        .await
        .map_err(report)?;
    println!("renamed {} to {}", session_id, title);
    Ok(())
}

pub async fn handle_delete_command(client: &ChatClient, session_id: &str) -> Result<()> {
    client.delete_session(session_id).await.map_err(report)?;
    println!("deleted {}", session_id);
    Ok(())
}

/// Load `session_id` with its history into a fresh reconciler.
async fn load_session(client: &ChatClient, session_id: &str) -> Result<SessionReconciler> {
    let detail = client.get_session(session_id).await.map_err(report)?;
    let mut reconciler = SessionReconciler::new();
    reconciler.insert_session(detail.session);
    reconciler.load_history(session_id, detail.messages);
    Ok(reconciler)
}

pub async fn handle_show_command(client: &ChatClient, session_id: &str) -> Result<()> {
    let reconciler = load_session(client, session_id).await?;
    if let Some(session) = reconciler.session(session_id) {
        println!("# {}", session.title);
    }
    println!("{}", format_snapshot(&reconciler.snapshot(session_id)));
    Ok(())
}

/// Stream a reply to stdout. Ctrl-C cancels the stream.
pub async fn handle_ask_command(client: &ChatClient, session_id: &str, text: &str) -> Result<()> {
    let mut reconciler = load_session(client, session_id).await?;
    let driver = StreamDriver::new(client.clone());

    let cancel = CancelHandle::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut printer = StreamPrinter::new();
    let mut stdout = std::io::stdout();
    let outcome = driver
        .send_cancellable(&mut reconciler, session_id, text, &cancel, |state, event| {
            let chunk = printer.render(state, event);
            write_chunk(&mut stdout, &chunk);
        })
        .await;
    interrupt.abort();

    match outcome {
        None => Err(eyre!("message is empty")),
        Some(StreamOutcome::Failed { reason }) => Err(eyre!(reason)),
        Some(_) => Ok(()),
    }
}

/// Write live output, logging instead of aborting the stream on failure
/// (for example a closed pipe). Returns whether the chunk was written.
fn write_chunk(out: &mut impl Write, chunk: &str) -> bool {
    match out.write_all(chunk.as_bytes()).and_then(|()| out.flush()) {
        Ok(()) => true,
        Err(err) => {
            debug!(error = %err, "Failed to write stream output");
            false
        }
    }
}
