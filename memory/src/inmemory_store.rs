//! # In-Memory Conversation Store
//!
//! Process-lifetime implementation of [`ConversationStore`]. History is lost on restart.
//!
//! ## Thread Safety
//!
//! The session map sits behind `Arc<RwLock<>>`; each session has its own `Mutex`, so writers in
//! different sessions never contend and writers in the same session are serialized.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::store::ConversationStore;
use crate::types::Turn;
use crate::window::{total_size, trim_window};

type Session = Arc<Mutex<Vec<Turn>>>;

/// In-memory session store with per-session locks.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemoryConversationStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions that currently hold at least one turn.
    pub async fn session_count(&self) -> usize {
        let sessions: Vec<Session> = self.sessions.read().await.values().cloned().collect();
        let mut count = 0;
        for session in sessions {
            if !session.lock().await.is_empty() {
                count += 1;
            }
        }
        count
    }

    /// Returns the session handle, creating an empty one if absent.
    async fn session(&self, session_id: &str) -> Session {
        if let Some(session) = self.sessions.read().await.get(session_id) {
            return session.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    /// Number of sessions held in the map, empty or not.
    #[cfg(test)]
    async fn tracked_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn existing_session(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, session_id: &str, turn: Turn) -> Result<(), anyhow::Error> {
        let session = self.session(session_id).await;
        let mut turns = session.lock().await;
        turns.push(turn);
        debug!(session_id = %session_id, count = turns.len(), "Turn appended");
        Ok(())
    }

    async fn get_all(&self, session_id: &str) -> Result<Vec<Turn>, anyhow::Error> {
        let Some(session) = self.existing_session(session_id).await else {
            return Ok(Vec::new());
        };
        let turns = session.lock().await.clone();
        debug!(session_id = %session_id, count = turns.len(), "Session history read");
        Ok(turns)
    }

    async fn replace(&self, session_id: &str, new_turns: Vec<Turn>) -> Result<(), anyhow::Error> {
        let session = self.session(session_id).await;
        let mut turns = session.lock().await;
        *turns = new_turns;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), anyhow::Error> {
        let in_use = {
            let mut sessions = self.sessions.write().await;
            match sessions.get(session_id).map(Arc::strong_count) {
                // Only the map holds the handle, and the write lock keeps it that way.
                Some(1) => {
                    sessions.remove(session_id);
                    None
                }
                Some(_) => sessions.get(session_id).cloned(),
                None => None,
            }
        };
        // A request still holds this session: empty it in place so that request's write lands in
        // the Vec later readers see.
        if let Some(session) = in_use {
            session.lock().await.clear();
        }
        info!(session_id = %session_id, "Session history cleared");
        Ok(())
    }

    async fn commit_turn(
        &self,
        session_id: &str,
        turn: Turn,
        budget: usize,
    ) -> Result<Vec<Turn>, anyhow::Error> {
        let session = self.session(session_id).await;
        let mut turns = session.lock().await;
        turns.push(turn);
        let original_count = turns.len();
        let kept = trim_window(&turns, budget);
        *turns = kept.clone();

        info!(
            session_id = %session_id,
            original_count,
            remaining_count = kept.len(),
            total_size = total_size(&kept),
            budget,
            "Turn committed and window trimmed"
        );
        Ok(kept)
    }
}
