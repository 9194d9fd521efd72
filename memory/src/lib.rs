//! # Memory Crate
//!
//! Conversation memory for the bot: each session (chat + sender) owns an ordered list of
//! question/answer [`Turn`]s, oldest first, kept within a size budget.
//!
//! ## Quick Start
//!
//! ```rust
//! use memory::{ConversationStore, InMemoryConversationStore, Turn};
//!
//! # async fn example() -> Result<(), anyhow::Error> {
//! let store = InMemoryConversationStore::new();
//! store.commit_turn("oc_1u_1", Turn::new("hi", "hello!"), 1024).await?;
//! let history = store.get_all("oc_1u_1").await?;
//! assert_eq!(history.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`] - [`Turn`]
//! - [`window`] - newest-first size budget trimming
//! - [`store`] - [`ConversationStore`] interface
//! - [`inmemory_store`] - process-lifetime store with per-session locks
//!
//! ## External Interactions
//!
//! - **Bot handlers**: the chat handler reads history to build prompts and commits new turns;
//!   the clear command deletes a session.

pub mod inmemory_store;
pub mod store;
pub mod types;
pub mod window;

pub use inmemory_store::InMemoryConversationStore;
pub use store::ConversationStore;
pub use types::Turn;
pub use window::{total_size, trim_window};
