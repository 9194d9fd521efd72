//! # dbot-core
//!
//! Core types and traits for the Feishu bot: [`Bot`], [`Handler`], message and user types,
//! slash-command classification and tracing initialization. Transport-agnostic; used by
//! handler-chain, the handler crates and feishu-bot.

pub mod bot;
pub mod command;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{send_reply, Bot};
pub use command::{
    strip_mentions, Command, CLEAR_COMMAND, HELP_COMMAND, HELP_TEXT, IMAGE_COMMAND_PREFIX,
};
pub use error::{DbotError, Result};
pub use logger::init_tracing;
pub use types::{Chat, ChatType, Handler, HandlerResponse, Mention, Message, ToCoreMessage, User};
