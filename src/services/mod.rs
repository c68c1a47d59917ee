//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the chat and listing logic so route handlers can
//! stay focused on protocol translation.

pub mod chat;
pub mod projects;
pub mod reply;
pub mod session;
