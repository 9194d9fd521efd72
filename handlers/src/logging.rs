use async_trait::async_trait;
use dbot_core::{Handler, HandlerResponse, Message, Result};
use tracing::{info, instrument};

/// Logs every inbound message and the chain's final response.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

#[async_trait]
impl Handler for LoggingHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        info!(
            event_id = %message.event_id,
            message_id = %message.id,
            user_id = %message.user.id,
            chat_id = %message.chat.id,
            chat_type = ?message.chat.chat_type,
            message_type = %message.message_type,
            content_preview = %message.content.chars().take(100).collect::<String>(),
            "Received message"
        );
        Ok(true)
    }

    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        match response {
            HandlerResponse::Reply(text) => info!(
                message_id = %message.id,
                reply_len = text.chars().count(),
                "Replied to message"
            ),
            other => info!(
                message_id = %message.id,
                response = ?other,
                "Message processed without reply"
            ),
        }
        Ok(())
    }
}
