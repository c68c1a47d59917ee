//! Chat session REST routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::services::chat::{Message, SubmitError};
use crate::services::session::{self, CopiedMessage, SessionError, SessionSnapshot};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PostMessageBody {
    pub content: String,
}

/// `POST /api/chat/sessions` — start a session holding the greeting.
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionSnapshot>) {
    (StatusCode::CREATED, Json(session::create_session(&state).await))
}

/// `GET /api/chat/sessions/:id` — messages and pending flag.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let snapshot = session::snapshot(&state, session_id)
        .await
        .map_err(session_error_to_status)?;
    Ok(Json(snapshot))
}

/// `DELETE /api/chat/sessions/:id` — end a session.
pub async fn delete_session(State(state): State<AppState>, Path(session_id): Path<Uuid>) -> StatusCode {
    match session::delete_session(&state, session_id).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => session_error_to_status(e),
    }
}

/// `POST /api/chat/sessions/:id/messages` — submit a user message.
///
/// Accepted submits answer 202: the assistant reply follows over the
/// websocket.
pub async fn post_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<PostMessageBody>,
) -> Result<(StatusCode, Json<Message>), StatusCode> {
    let message = session::submit_message(&state, session_id, &body.content, None)
        .await
        .map_err(|e| {
            warn!(%session_id, error = %e, "chat: submit rejected");
            session_error_to_status(e)
        })?;
    Ok((StatusCode::ACCEPTED, Json(message)))
}

/// `GET /api/chat/sessions/:id/messages/:message_id/copy` — clipboard text.
pub async fn copy_message(
    State(state): State<AppState>,
    Path((session_id, message_id)): Path<(Uuid, String)>,
) -> Result<Json<CopiedMessage>, StatusCode> {
    let copied = session::copy_message(&state, session_id, &message_id)
        .await
        .map_err(session_error_to_status)?;
    Ok(Json(copied))
}

pub(crate) fn session_error_to_status(err: SessionError) -> StatusCode {
    match err {
        SessionError::NotFound(_) | SessionError::MessageNotFound(_) => StatusCode::NOT_FOUND,
        SessionError::Submit(SubmitError::Empty) => StatusCode::BAD_REQUEST,
        SessionError::Submit(SubmitError::ReplyPending) => StatusCode::CONFLICT,
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
