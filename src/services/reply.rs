//! Reply scheduler — the two-stage simulated assistant response.
//!
//! DESIGN
//! ======
//! One spawned task per accepted submit:
//! 1. sleep `reply_delay`, append the `building` assistant message, clear
//!    pending, push `chat:message`
//! 2. sleep `complete_delay`, flip that message to `completed` by id, push
//!    `chat:status` and a `notify:toast`
//!
//! No lock is held across a sleep. There is no cancellation: a stage that
//! finds its session deleted just stops.

use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::frame::now_ms;
use crate::services::chat::{Message, MessageStatus};
use crate::services::session::{self, Toast};
use crate::state::AppState;

/// Spawn the reply sequence for one submitted prompt.
pub fn spawn_reply(state: AppState, session_id: Uuid, prompt: String) -> JoinHandle<()> {
    tokio::spawn(async move { run_reply(&state, session_id, &prompt).await })
}

pub(crate) async fn run_reply(state: &AppState, session_id: Uuid, prompt: &str) {
    tokio::time::sleep(state.timing.reply_delay).await;

    let Some(reply) = deliver_reply(state, session_id, prompt).await else {
        debug!(%session_id, "reply stage skipped: session gone");
        return;
    };
    info!(%session_id, message_id = %reply.id, "assistant reply delivered");
    session::broadcast(state, session_id, &session::message_frame(session_id, &reply), None).await;

    tokio::time::sleep(state.timing.complete_delay).await;

    let Some(completed) = complete_reply(state, session_id, &reply.id).await else {
        debug!(%session_id, message_id = %reply.id, "completion stage skipped: session gone");
        return;
    };
    info!(%session_id, message_id = %completed.id, "assistant reply completed");

    let status = completed.status.unwrap_or(MessageStatus::Completed);
    session::broadcast(state, session_id, &session::status_frame(session_id, &completed.id, status), None).await;
    session::broadcast(state, session_id, &session::toast_frame(session_id, &Toast::project_ready()), None).await;
}

async fn deliver_reply(state: &AppState, session_id: Uuid, prompt: &str) -> Option<Message> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&session_id)?;
    session.touch();
    Some(session.chat.deliver_reply(prompt, now_ms()))
}

async fn complete_reply(state: &AppState, session_id: Uuid, message_id: &str) -> Option<Message> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&session_id)?;
    session.touch();
    session.chat.set_status(message_id, MessageStatus::Completed)
}

#[cfg(test)]
#[path = "reply_test.rs"]
mod tests;
