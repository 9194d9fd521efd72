//! Reply dispatcher abstraction.
//!
//! [`Bot`] is transport-agnostic; feishu-bot implements it on top of the Feishu Open API.

use crate::error::Result;
use crate::types::{HandlerResponse, Message};
use async_trait::async_trait;
use tracing::error;

/// Sends text back to the messaging platform. Implementations map to a transport (e.g. Feishu).
///
/// Failures surface as [`DbotError::Delivery`](crate::DbotError::Delivery); callers log them
/// and never retry.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Replies to the given message in the same thread.
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()>;
}

/// Sends `text` as a reply and returns [`HandlerResponse::Reply`] carrying it.
///
/// Delivery failures are logged and swallowed; the chain still ends with the reply text so
/// `after()` hooks see what was attempted.
pub async fn send_reply(bot: &dyn Bot, message: &Message, text: &str) -> HandlerResponse {
    if let Err(e) = bot.reply_to(message, text).await {
        error!(
            error = %e,
            message_id = %message.id,
            chat_id = %message.chat.id,
            "Failed to deliver reply"
        );
    }
    HandlerResponse::Reply(text.to_string())
}
