use async_trait::async_trait;
use dbot_core::{send_reply, Bot, ChatType, Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Reply for messages that are not plain text.
pub const UNSUPPORTED_MESSAGE_TYPE: &str = "暂不支持其他类型的提问";

/// P2P chats always pass; in group chats only messages whose first mention is the bot get
/// through. Other chat types are dropped.
#[derive(Debug, Clone)]
pub struct MentionGateHandler {
    bot_name: String,
}

impl MentionGateHandler {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
        }
    }

    pub fn should_respond(&self, message: &Message) -> bool {
        match message.chat.chat_type {
            ChatType::P2p => true,
            ChatType::Group => message
                .mentions
                .first()
                .is_some_and(|mention| mention.name == self.bot_name),
            ChatType::Unknown => false,
        }
    }
}

#[async_trait]
impl Handler for MentionGateHandler {
    async fn before(&self, message: &Message) -> Result<bool> {
        let respond = self.should_respond(message);
        if !respond {
            debug!(
                chat_id = %message.chat.id,
                chat_type = ?message.chat.chat_type,
                mention_count = message.mentions.len(),
                "Message not addressed to the bot, ignored"
            );
        }
        Ok(respond)
    }
}

/// Answers non-text messages with a fixed notice and stops the chain.
#[derive(Clone)]
pub struct TextOnlyHandler {
    bot: Arc<dyn Bot>,
}

impl TextOnlyHandler {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Handler for TextOnlyHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.is_text() {
            return Ok(HandlerResponse::Continue);
        }
        info!(
            message_id = %message.id,
            message_type = %message.message_type,
            "Unsupported message type"
        );
        Ok(send_reply(self.bot.as_ref(), message, UNSUPPORTED_MESSAGE_TYPE).await)
    }
}
