//! Chat session registry — create, join, submit, and broadcast.
//!
//! ARCHITECTURE
//! ============
//! HTTP and websocket routes both land here. Mutations take the session
//! map's write lock, apply one `ChatSession` operation, and release the
//! lock before any frame is sent. Delayed work is handed to the reply
//! scheduler, which re-enters through the same lock.
//!
//! TRADE-OFFS
//! ==========
//! Sessions outlive their last client, so a reconnect resumes the
//! conversation. They end on explicit delete, on idle eviction by the
//! sweeper once client-less and untouched for the configured TTL, or on
//! process exit.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::catalog::ActiveProject;
use crate::frame::{Data, Frame, now_ms};
use crate::services::chat::{Message, MessageStatus, SubmitError};
use crate::services::reply;
use crate::state::{AppState, SessionState};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("chat session not found: {0}")]
    NotFound(Uuid),
    #[error("message not found: {0}")]
    MessageNotFound(String),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

impl crate::frame::ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_SESSION_NOT_FOUND",
            Self::MessageNotFound(_) => "E_MESSAGE_NOT_FOUND",
            Self::Submit(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Submit(e) => e.retryable(),
            _ => false,
        }
    }
}

// =============================================================================
// VIEW TYPES
// =============================================================================

/// Ephemeral user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
}

impl Toast {
    #[must_use]
    pub fn project_ready() -> Self {
        Self {
            title: "Project ready!".into(),
            description: "The GitHub PR and preview environment are ready.".into(),
        }
    }

    #[must_use]
    pub fn copied() -> Self {
        Self { title: "Copied".into(), description: "Message text copied to the clipboard.".into() }
    }
}

/// Everything a client needs to render a chat page.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub messages: Vec<Message>,
    pub pending: bool,
    pub active_project: Option<ActiveProject>,
    pub templates: Vec<String>,
}

/// Text handed back for the client's clipboard.
#[derive(Debug, Clone, Serialize)]
pub struct CopiedMessage {
    pub content: String,
    pub toast: Toast,
}

fn snapshot_of(state: &AppState, session_id: Uuid, session: &SessionState) -> SessionSnapshot {
    SessionSnapshot {
        session_id,
        messages: session.chat.messages().to_vec(),
        pending: session.chat.is_pending(),
        active_project: state.catalog.active_project.clone(),
        templates: state.catalog.templates.clone(),
    }
}

// =============================================================================
// PUSH FRAMES
// =============================================================================

pub(crate) fn message_frame(session_id: Uuid, message: &Message) -> Frame {
    Frame::request("chat:message", Data::new())
        .with_session_id(session_id)
        .with_data("message", serde_json::to_value(message).unwrap_or_default())
}

pub(crate) fn status_frame(session_id: Uuid, message_id: &str, status: MessageStatus) -> Frame {
    Frame::request("chat:status", Data::new())
        .with_session_id(session_id)
        .with_data("message_id", message_id)
        .with_data("status", serde_json::to_value(status).unwrap_or_default())
}

pub(crate) fn toast_frame(session_id: Uuid, toast: &Toast) -> Frame {
    Frame::request("notify:toast", Data::new())
        .with_session_id(session_id)
        .with_data("title", toast.title.as_str())
        .with_data("description", toast.description.as_str())
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Create a fresh session holding only the greeting.
pub async fn create_session(state: &AppState) -> SessionSnapshot {
    let session_id = Uuid::new_v4();
    let session = SessionState::new();
    let snapshot = snapshot_of(state, session_id, &session);

    state.sessions.write().await.insert(session_id, session);
    info!(%session_id, "chat session created");
    snapshot
}

/// Current state of one session.
///
/// # Errors
///
/// `NotFound` if the session does not exist.
pub async fn snapshot(state: &AppState, session_id: Uuid) -> Result<SessionSnapshot, SessionError> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&session_id)
        .ok_or(SessionError::NotFound(session_id))?;
    Ok(snapshot_of(state, session_id, session))
}

/// Drop a session. Reply stages still in flight find it gone and stop.
///
/// # Errors
///
/// `NotFound` if the session does not exist.
pub async fn delete_session(state: &AppState, session_id: Uuid) -> Result<(), SessionError> {
    let removed = state.sessions.write().await.remove(&session_id);
    if removed.is_none() {
        return Err(SessionError::NotFound(session_id));
    }
    info!(%session_id, "chat session deleted");
    Ok(())
}

/// Register a websocket client on a session and return its snapshot.
///
/// # Errors
///
/// `NotFound` if the session does not exist.
pub async fn join_session(
    state: &AppState,
    session_id: Uuid,
    client_id: Uuid,
    tx: mpsc::Sender<Frame>,
) -> Result<SessionSnapshot, SessionError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or(SessionError::NotFound(session_id))?;
    session.clients.insert(client_id, tx);
    session.touch();
    info!(%session_id, %client_id, clients = session.clients.len(), "client joined session");
    Ok(snapshot_of(state, session_id, session))
}

/// Join `requested` if it exists, otherwise create a new session and join it.
pub async fn join_or_create(
    state: &AppState,
    requested: Option<Uuid>,
    client_id: Uuid,
    tx: mpsc::Sender<Frame>,
) -> SessionSnapshot {
    if let Some(session_id) = requested {
        if let Ok(snapshot) = join_session(state, session_id, client_id, tx.clone()).await {
            return snapshot;
        }
    }

    let created = create_session(state).await;
    match join_session(state, created.session_id, client_id, tx).await {
        Ok(snapshot) => snapshot,
        // Deleted between create and join; the empty snapshot is still valid.
        Err(_) => created,
    }
}

/// Unregister a websocket client. The session itself stays alive.
pub async fn part_session(state: &AppState, session_id: Uuid, client_id: Uuid) {
    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&session_id) else {
        return;
    };
    session.clients.remove(&client_id);
    session.touch();
    info!(%session_id, %client_id, remaining = session.clients.len(), "client left session");
}

/// Send a frame to every client of a session, optionally skipping one.
pub async fn broadcast(state: &AppState, session_id: Uuid, frame: &Frame, exclude: Option<Uuid>) {
    let sessions = state.sessions.read().await;
    let Some(session) = sessions.get(&session_id) else {
        return;
    };

    for (client_id, tx) in &session.clients {
        if exclude == Some(*client_id) {
            continue;
        }
        // Best-effort: if a client's channel is full, skip it.
        let _ = tx.try_send(frame.clone());
    }
}

// =============================================================================
// IDLE EVICTION
// =============================================================================

/// Upper bound on the sweep period, so long TTLs are still checked often.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Remove every idle session and return how many were dropped.
pub async fn sweep_idle(state: &AppState, ttl: Duration) -> usize {
    let now = Instant::now();
    let mut sessions = state.sessions.write().await;
    let before = sessions.len();
    sessions.retain(|session_id, session| {
        let idle = session.is_idle(now, ttl);
        if idle {
            info!(%session_id, "idle chat session evicted");
        }
        !idle
    });
    before - sessions.len()
}

/// Spawn the background task that evicts idle sessions every
/// `min(ttl, 60s)`. Callers skip this when `ttl` is zero.
pub fn spawn_idle_sweeper(state: AppState, ttl: Duration) -> JoinHandle<()> {
    let period = ttl.min(MAX_SWEEP_INTERVAL);
    info!(ttl = ?ttl, period = ?period, "idle session sweep configured");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            let evicted = sweep_idle(&state, ttl).await;
            if evicted > 0 {
                let remaining = state.sessions.read().await.len();
                info!(evicted, remaining, "idle sessions swept");
            }
        }
    })
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Submit a user message and schedule the simulated reply.
///
/// The user message is echoed to every client except `sender` (the sender
/// gets it in its own response). Passing `None` echoes to all clients.
///
/// # Errors
///
/// `NotFound` for an unknown session, or the `SubmitError` rejection. A
/// rejected submit changes nothing and schedules nothing.
pub async fn submit_message(
    state: &AppState,
    session_id: Uuid,
    text: &str,
    sender: Option<Uuid>,
) -> Result<Message, SessionError> {
    let message = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;
        let message = session.chat.submit(text, now_ms())?;
        session.touch();
        message
    };

    info!(%session_id, message_id = %message.id, "user message accepted");
    broadcast(state, session_id, &message_frame(session_id, &message), sender).await;
    reply::spawn_reply(state.clone(), session_id, text.to_string());

    Ok(message)
}

/// Look up a message's text for the client's clipboard.
///
/// # Errors
///
/// `NotFound` for an unknown session, `MessageNotFound` for an unknown id.
pub async fn copy_message(state: &AppState, session_id: Uuid, message_id: &str) -> Result<CopiedMessage, SessionError> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&session_id)
        .ok_or(SessionError::NotFound(session_id))?;
    let message = session
        .chat
        .get(message_id)
        .ok_or_else(|| SessionError::MessageNotFound(message_id.to_string()))?;
    Ok(CopiedMessage { content: message.content.clone(), toast: Toast::copied() })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
