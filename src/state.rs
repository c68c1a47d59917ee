//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the read-only catalog, the reply timing, and a map of live chat
//! sessions. Each session owns its message log and the outgoing channels of
//! the websocket clients watching it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, mpsc};
use tokio::time::Instant;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::ReplyTiming;
use crate::frame::{Frame, now_ms};
use crate::services::chat::ChatSession;

// =============================================================================
// SESSION STATE
// =============================================================================

/// Per-session live state. Memory only; gone when the process exits.
pub struct SessionState {
    pub chat: ChatSession,
    /// Connected clients: `client_id` -> sender for outgoing frames.
    pub clients: HashMap<Uuid, mpsc::Sender<Frame>>,
    /// Last join, part, submit or reply stage. Drives idle eviction.
    pub last_active: Instant,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self { chat: ChatSession::new(now_ms()), clients: HashMap::new(), last_active: Instant::now() }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// No clients, no reply pending, and untouched for at least `ttl`.
    #[must_use]
    pub fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        self.clients.is_empty() && !self.chat.is_pending() && now.saturating_duration_since(self.last_active) >= ttl
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub timing: ReplyTiming,
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: Catalog, timing: ReplyTiming) -> Self {
        Self { catalog: Arc::new(catalog), timing, sessions: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_state_has_greeting_and_no_clients() {
        let session = SessionState::new();
        assert_eq!(session.chat.messages().len(), 1);
        assert!(session.clients.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_requires_no_clients_no_pending_and_elapsed_ttl() {
        let ttl = Duration::from_secs(60);
        let mut session = SessionState::new();
        assert!(!session.is_idle(Instant::now(), ttl));

        tokio::time::advance(ttl).await;
        assert!(session.is_idle(Instant::now(), ttl));

        session.touch();
        assert!(!session.is_idle(Instant::now(), ttl));

        tokio::time::advance(ttl).await;
        let (tx, _rx) = mpsc::channel(1);
        session.clients.insert(Uuid::new_v4(), tx);
        assert!(!session.is_idle(Instant::now(), ttl));

        session.clients.clear();
        session.chat.submit("hold", now_ms()).unwrap();
        assert!(!session.is_idle(Instant::now(), ttl));
    }

    #[tokio::test]
    async fn seed_session_registers_state() {
        let state = test_helpers::test_app_state();
        let id = test_helpers::seed_session(&state).await;
        assert!(state.sessions.read().await.contains_key(&id));
        assert_eq!(test_helpers::message_count(&state, id).await, 1);
    }

    #[test]
    fn clones_share_session_map() {
        let state = test_helpers::test_app_state();
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.sessions, &clone.sessions));
        assert!(Arc::ptr_eq(&state.catalog, &clone.catalog));
    }
}
