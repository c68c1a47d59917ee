//! Chat session — ordered message log with a single pending reply slot.
//!
//! DESIGN
//! ======
//! `ChatSession` is plain data plus synchronous mutations. It knows nothing
//! about timers, locks, or sockets: the reply scheduler drives the
//! `submit → deliver_reply → set_status` sequence and the session registry
//! owns the locking. Messages are append-only; the only in-place mutation
//! is a status update looked up by id.

use serde::{Deserialize, Serialize};

// =============================================================================
// MESSAGE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Thinking,
    Building,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Pr,
    Deploy,
    File,
    Migration,
}

/// Link-like affordance attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

// =============================================================================
// CANNED CONTENT
// =============================================================================

pub const GREETING: &str =
    "Hello! Welcome to the backend builder. Let's build a backend application through chat. What would you like to create?";

/// Assistant reply body. Embeds the raw user text; otherwise constant.
#[must_use]
pub fn canned_reply(prompt: &str) -> String {
    format!(
        "Got it! I'll build a backend API for \"{prompt}\" using FastAPI + Supabase. Here is the plan:\n\
         \n\
         1. Create the project structure\n\
         2. Set up the FastAPI application\n\
         3. Design the Supabase database schema\n\
         4. Implement the API endpoints\n\
         5. Configure the Docker container\n\
         6. Add a GitHub Actions CI/CD pipeline\n\
         \n\
         Generating code..."
    )
}

/// Actions attached to every simulated reply.
#[must_use]
pub fn canned_actions() -> Vec<Action> {
    vec![
        Action {
            kind: ActionKind::Pr,
            label: "PR #123: Initial project setup".into(),
            url: Some("#".into()),
            description: Some("FastAPI project structure and dependencies".into()),
        },
        Action {
            kind: ActionKind::Migration,
            label: "Database migration created".into(),
            url: Some("#".into()),
            description: Some("Created initial schema for user management".into()),
        },
        Action {
            kind: ActionKind::Deploy,
            label: "Deploy to Supabase Edge Functions".into(),
            url: Some("#".into()),
            description: Some("Preview environment ready".into()),
        },
    ]
}

// =============================================================================
// IDS
// =============================================================================

/// Timestamp-derived ids that stay strictly increasing within a session,
/// even when several messages are created in the same millisecond.
#[derive(Debug, Clone, Default)]
pub struct MessageIds {
    last: i64,
}

impl MessageIds {
    pub fn next(&mut self, now_ms: i64) -> String {
        let id = now_ms.max(self.last.saturating_add(1));
        self.last = id;
        id.to_string()
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("message is empty")]
    Empty,
    #[error("a reply is already pending")]
    ReplyPending,
}

impl crate::frame::ErrorCode for SubmitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_EMPTY_MESSAGE",
            Self::ReplyPending => "E_REPLY_PENDING",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ReplyPending)
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<Message>,
    pending: bool,
    ids: MessageIds,
}

impl ChatSession {
    /// New session holding the completed assistant greeting.
    #[must_use]
    pub fn new(now_ms: i64) -> Self {
        let mut ids = MessageIds::default();
        let greeting = Message {
            id: ids.next(now_ms),
            role: Role::Assistant,
            content: GREETING.to_string(),
            timestamp: now_ms,
            status: Some(MessageStatus::Completed),
            actions: Vec::new(),
        };
        Self { messages: vec![greeting], pending: false, ids }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Append a user message and mark a reply as pending.
    ///
    /// The stored content is the raw text; only the emptiness check trims.
    ///
    /// # Errors
    ///
    /// `Empty` for blank text, `ReplyPending` while a reply is outstanding.
    /// Neither mutates the session.
    pub fn submit(&mut self, text: &str, now_ms: i64) -> Result<Message, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.pending {
            return Err(SubmitError::ReplyPending);
        }

        let message = Message {
            id: self.ids.next(now_ms),
            role: Role::User,
            content: text.to_string(),
            timestamp: now_ms,
            status: None,
            actions: Vec::new(),
        };
        self.messages.push(message.clone());
        self.pending = true;
        Ok(message)
    }

    /// Append the simulated assistant reply (status `building`) and clear
    /// the pending flag.
    pub fn deliver_reply(&mut self, prompt: &str, now_ms: i64) -> Message {
        let message = Message {
            id: self.ids.next(now_ms),
            role: Role::Assistant,
            content: canned_reply(prompt),
            timestamp: now_ms,
            status: Some(MessageStatus::Building),
            actions: canned_actions(),
        };
        self.messages.push(message.clone());
        self.pending = false;
        message
    }

    /// Update one message's status in place. Returns the updated message,
    /// or `None` if no message has that id.
    pub fn set_status(&mut self, id: &str, status: MessageStatus) -> Option<Message> {
        let message = self.messages.iter_mut().find(|m| m.id == id)?;
        message.status = Some(status);
        Some(message.clone())
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
