//! # Conversation Storage
//!
//! [`ConversationStore`] is the only reader and writer of session history. Backends must give
//! each session key exclusive access for `append`, `replace`, `delete` and `commit_turn` so
//! concurrent requests in the same session cannot lose updates.
//!
//! ### Implementations
//!
//! - **InMemoryConversationStore**: process-lifetime storage (see [`crate::inmemory_store`])

use async_trait::async_trait;

use crate::types::Turn;
use crate::window::trim_window;

/// Trait for storing and retrieving per-session conversation turns.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Appends a turn to the end of the session, creating the session if absent.
    async fn append(&self, session_id: &str, turn: Turn) -> Result<(), anyhow::Error>;

    /// Returns the session's turns, oldest first. Empty when the session does not exist.
    async fn get_all(&self, session_id: &str) -> Result<Vec<Turn>, anyhow::Error>;

    /// Atomically replaces the session's turns.
    async fn replace(&self, session_id: &str, turns: Vec<Turn>) -> Result<(), anyhow::Error>;

    /// Removes all history for the session. Idempotent.
    async fn delete(&self, session_id: &str) -> Result<(), anyhow::Error>;

    /// Appends `turn`, trims the session to `budget` and commits the result; returns the retained turns.
    ///
    /// The default implementation composes the primitives and is not atomic; backends override
    /// it to run the whole read-modify-write under the session lock.
    async fn commit_turn(
        &self,
        session_id: &str,
        turn: Turn,
        budget: usize,
    ) -> Result<Vec<Turn>, anyhow::Error> {
        self.append(session_id, turn).await?;
        let turns = self.get_all(session_id).await?;
        let kept = trim_window(&turns, budget);
        self.replace(session_id, kept.clone()).await?;
        Ok(kept)
    }
}
