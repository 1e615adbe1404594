//! Conversation session storage.
//!
//! Each session id maps to an ordered buffer of messages, oldest first. The
//! orchestrator only talks to the [`SessionStore`] trait, so a persistent or
//! shared backend can replace [`InMemorySessionStore`] without touching the
//! chat pipeline.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::self_model::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a conversation buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            role,
            content: content.into(),
            metadata,
        }
    }
}

/// Storage for per-session conversation buffers.
///
/// Unknown sessions are never an error: they read as empty and removing them
/// is a no-op.
pub trait SessionStore {
    /// Copy of the session's messages, oldest first.
    fn get(&self, session_id: &str) -> Vec<Message>;

    /// Append a message, creating the session if needed.
    fn append(&mut self, session_id: &str, message: Message);

    /// Drop the oldest messages until at most `max_len` remain. Returns how
    /// many were dropped.
    fn evict_to(&mut self, session_id: &str, max_len: usize) -> usize;

    /// Remove the whole session. Returns whether it existed.
    fn remove(&mut self, session_id: &str) -> bool;

    fn session_count(&self) -> usize;
}

/// Process-local store backed by one ring buffer per session.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: HashMap<String, VecDeque<Message>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> Vec<Message> {
        self.sessions
            .get(session_id)
            .map(|buf| buf.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn append(&mut self, session_id: &str, message: Message) {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .push_back(message);
    }

    fn evict_to(&mut self, session_id: &str, max_len: usize) -> usize {
        let Some(buf) = self.sessions.get_mut(session_id) else {
            return 0;
        };
        let excess = buf.len().saturating_sub(max_len);
        buf.drain(..excess);
        excess
    }

    fn remove(&mut self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
