//! WebSocket handler — bidirectional frame relay for one chat session.
//!
//! DESIGN
//! ======
//! On upgrade, attaches the client to the requested session (or a fresh
//! one) and enters a `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall prefix
//! - Session pushes (peer echoes, assistant replies, toasts) → forward
//!
//! Handler functions validate and call services, returning either reply
//! data or an error frame. Only `chat:send` fans out to peers, and that
//! happens inside the session service.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with ids and snapshot
//! 2. Client sends frames → dispatch → done/error reply to sender
//! 3. Close → part session (session stays alive for reconnects until idle eviction)

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::frame::{Data, ErrorCode, Frame, Status};
use crate::services;
use crate::services::projects::StatusFilter;
use crate::state::AppState;

/// Per-connection outbound buffer. Pushes beyond this are dropped.
const CLIENT_CHANNEL_CAPACITY: usize = 256;

/// Rejections raised by the gateway itself, before any service runs.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid json: {0}")]
    InvalidJson(String),
    #[error("only request frames are accepted")]
    NotARequest,
    #[error("unknown prefix: {0}")]
    UnknownPrefix(String),
    #[error("unknown {prefix} op: {op}")]
    UnknownOp { prefix: &'static str, op: String },
    #[error("{0} required")]
    MissingField(&'static str),
}

impl ErrorCode for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) | Self::NotARequest => "E_INVALID_FRAME",
            Self::UnknownPrefix(_) | Self::UnknownOp { .. } => "E_UNKNOWN_SYSCALL",
            Self::MissingField(_) => "E_MISSING_FIELD",
        }
    }
}

fn unknown_op(req: &Frame, prefix: &'static str) -> Frame {
    req.error_from(&GatewayError::UnknownOp { prefix, op: req.op().to_string() })
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let requested = params.get("session").and_then(|s| s.parse::<Uuid>().ok());
    ws.on_upgrade(move |socket| run_ws(socket, state, requested))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, requested: Option<Uuid>) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for receiving session pushes.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(CLIENT_CHANNEL_CAPACITY);

    let snapshot = services::session::join_or_create(&state, requested, client_id, client_tx).await;
    let session_id = snapshot.session_id;

    let welcome = Frame::request("session:connected", Data::new())
        .with_session_id(session_id)
        .with_data("client_id", client_id.to_string())
        .with_data("session_id", session_id.to_string())
        .with_data("snapshot", serde_json::to_value(&snapshot).unwrap_or_default());
    if send_frame(&mut socket, &welcome).await.is_err() {
        services::session::part_session(&state, session_id, client_id).await;
        return;
    }

    info!(%client_id, %session_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        for frame in process_inbound_text(&state, session_id, client_id, &text).await {
                            let _ = send_frame(&mut socket, &frame).await;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    services::session::part_session(&state, session_id, client_id).await;
    info!(%client_id, %session_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return frames for the sender.
///
/// Keeps websocket transport concerns separate from frame handling so
/// tests can drive dispatch without a socket.
async fn process_inbound_text(state: &AppState, session_id: Uuid, client_id: Uuid, text: &str) -> Vec<Frame> {
    let mut req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            // No parsed request to correlate with; reply on a synthetic one.
            let anchor = Frame::request("gateway:error", Data::new()).with_session_id(session_id);
            return vec![anchor.error_from(&GatewayError::InvalidJson(e.to_string()))];
        }
    };

    // Frames are always scoped to the connection's session.
    req.from = Some(client_id.to_string());
    req.session_id = Some(session_id);

    info!(%client_id, id = %req.id, syscall = %req.syscall, status = ?req.status, "ws: recv frame");

    if req.status != Status::Request {
        return vec![req.error_from(&GatewayError::NotARequest)];
    }

    let prefix = req.prefix();
    let result = match prefix {
        "chat" => handle_chat(state, session_id, client_id, &req).await,
        "project" => handle_project(state, &req),
        "dashboard" => handle_dashboard(state, &req),
        "overview" => handle_overview(state, &req),
        _ => Err(req.error_from(&GatewayError::UnknownPrefix(prefix.to_string()))),
    };

    match result {
        Ok(data) => vec![req.done_with(data)],
        Err(err_frame) => vec![err_frame],
    }
}

// =============================================================================
// CHAT HANDLERS
// =============================================================================

async fn handle_chat(state: &AppState, session_id: Uuid, client_id: Uuid, req: &Frame) -> Result<Data, Frame> {
    match req.op() {
        "send" => {
            let content = req.data_str("content").unwrap_or("");
            match services::session::submit_message(state, session_id, content, Some(client_id)).await {
                Ok(message) => {
                    let mut data = Data::new();
                    data.insert("message".into(), serde_json::to_value(&message).unwrap_or_default());
                    Ok(data)
                }
                Err(e) => {
                    warn!(%session_id, %client_id, error = %e, "ws: chat send rejected");
                    Err(req.error_from(&e))
                }
            }
        }
        "history" => match services::session::snapshot(state, session_id).await {
            Ok(snapshot) => {
                let mut data = Data::new();
                data.insert("snapshot".into(), serde_json::to_value(&snapshot).unwrap_or_default());
                Ok(data)
            }
            Err(e) => Err(req.error_from(&e)),
        },
        "copy" => {
            let Some(message_id) = req.data_str("message_id") else {
                return Err(req.error_from(&GatewayError::MissingField("message_id")));
            };
            match services::session::copy_message(state, session_id, message_id).await {
                Ok(copied) => {
                    let mut data = Data::new();
                    data.insert("content".into(), serde_json::json!(copied.content));
                    data.insert("toast".into(), serde_json::to_value(&copied.toast).unwrap_or_default());
                    Ok(data)
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        _ => Err(unknown_op(req, "chat")),
    }
}

// =============================================================================
// LISTING HANDLERS
// =============================================================================

fn handle_project(state: &AppState, req: &Frame) -> Result<Data, Frame> {
    match req.op() {
        "list" => {
            let status = StatusFilter::parse(req.data_str("status")).map_err(|e| req.error_from(&e))?;
            let query = req.data_str("q").unwrap_or("");
            let listing = services::projects::list_projects(&state.catalog.projects, query, status);

            let mut data = Data::new();
            data.insert("projects".into(), serde_json::to_value(&listing.projects).unwrap_or_default());
            data.insert("total".into(), serde_json::json!(listing.total));
            Ok(data)
        }
        _ => Err(unknown_op(req, "project")),
    }
}

fn handle_dashboard(state: &AppState, req: &Frame) -> Result<Data, Frame> {
    match req.op() {
        "get" => {
            let dashboard = &state.catalog.dashboard;
            let mut data = Data::new();
            data.insert("stats".into(), serde_json::to_value(&dashboard.stats).unwrap_or_default());
            data.insert("projects".into(), serde_json::to_value(&dashboard.projects).unwrap_or_default());
            data.insert("activities".into(), serde_json::to_value(&dashboard.activities).unwrap_or_default());
            Ok(data)
        }
        _ => Err(unknown_op(req, "dashboard")),
    }
}

fn handle_overview(state: &AppState, req: &Frame) -> Result<Data, Frame> {
    match req.op() {
        "get" => {
            let mut data = Data::new();
            data.insert("features".into(), serde_json::to_value(&state.catalog.features).unwrap_or_default());
            Ok(data)
        }
        _ => Err(unknown_op(req, "overview")),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == Status::Error {
        let code = frame.data_str("code").unwrap_or("-");
        let message = frame.data_str("message").unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else if frame.status.is_terminal() {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    } else {
        debug!(id = %frame.id, syscall = %frame.syscall, "ws: push frame");
    }
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
