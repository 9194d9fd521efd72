//! # Handlers for dbot framework
//!
//! Handler implementations that run ahead of the model calls: logging, group mention gating,
//! non-text rejection and the `/help` / `/clear` commands. [`EventDeduplicator`] is consulted by
//! the webhook before a message reaches the chain.

mod command_handler;
mod dedup;
mod gate;
mod logging;

#[cfg(test)]
mod test;

pub use command_handler::{CommandHandler, CLEAR_CONFIRMATION, ERROR_MESSAGE};
pub use dedup::EventDeduplicator;
pub use gate::{MentionGateHandler, TextOnlyHandler, UNSUPPORTED_MESSAGE_TYPE};
pub use logging::LoggingHandler;
