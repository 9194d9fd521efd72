//! `/help` and `/clear`. Unknown slash commands classify as help. `/image` and chat pass through.

use async_trait::async_trait;
use dbot_core::{
    send_reply, Bot, Command, DbotError, Handler, HandlerResponse, Message, Result, HELP_TEXT,
};
use memory::ConversationStore;
use std::sync::Arc;
use tracing::{error, info, instrument};

pub const CLEAR_CONFIRMATION: &str = "✅记忆已清除";
/// Generic failure reply.
pub const ERROR_MESSAGE: &str = "处理消息时出现错误，请稍后重试。";

#[derive(Clone)]
pub struct CommandHandler {
    store: Arc<dyn ConversationStore>,
    bot: Arc<dyn Bot>,
}

impl CommandHandler {
    pub fn new(store: Arc<dyn ConversationStore>, bot: Arc<dyn Bot>) -> Self {
        Self { store, bot }
    }

    async fn clear(&self, message: &Message) -> HandlerResponse {
        let session_id = message.session_id();
        match self
            .store
            .delete(&session_id)
            .await
            .map_err(|e| DbotError::Storage(e.to_string()))
        {
            Ok(()) => {
                info!(session_id = %session_id, "Conversation cleared by user");
                send_reply(self.bot.as_ref(), message, CLEAR_CONFIRMATION).await
            }
            Err(e) => {
                error!(error = %e, session_id = %session_id, "Failed to clear conversation");
                send_reply(self.bot.as_ref(), message, ERROR_MESSAGE).await
            }
        }
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        match Command::classify(&message.content) {
            Command::Help => Ok(send_reply(self.bot.as_ref(), message, HELP_TEXT).await),
            Command::Clear => Ok(self.clear(message).await),
            Command::Image { .. } | Command::Chat { .. } => Ok(HandlerResponse::Continue),
        }
    }
}
