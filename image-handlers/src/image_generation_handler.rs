//! Image generation handler: sends the generated image URL back for `/image <prompt>`.

use async_trait::async_trait;
use dbot_core::{send_reply, Bot, Command, Handler, HandlerResponse, Message, Result, HELP_TEXT};
use image_generation_client::ImageGenerator;
use std::sync::Arc;
use tracing::{error, info, instrument};

pub const MSG_GENERATION_FAILED: &str = "生成图片时出现错误，请稍后重试。";

/// Handles `/image`. An empty prompt gets the usage message instead of an API call.
#[derive(Clone)]
pub struct ImageGenerationHandler {
    image_client: Arc<dyn ImageGenerator>,
    bot: Arc<dyn Bot>,
}

impl ImageGenerationHandler {
    pub fn new(image_client: Arc<dyn ImageGenerator>, bot: Arc<dyn Bot>) -> Self {
        Self { image_client, bot }
    }

    async fn handle_image_generation(&self, message: &Message, prompt: &str) -> HandlerResponse {
        info!(
            user_id = %message.user.id,
            chat_id = %message.chat.id,
            prompt_preview = %prompt.chars().take(50).collect::<String>(),
            "Processing image generation request"
        );

        match self.image_client.generate_image(prompt).await {
            Ok(url) => {
                info!(image_url = %url, "Image generated");
                send_reply(self.bot.as_ref(), message, &url).await
            }
            Err(e) => {
                error!(error = %e, "Image generation failed");
                send_reply(self.bot.as_ref(), message, MSG_GENERATION_FAILED).await
            }
        }
    }
}

#[async_trait]
impl Handler for ImageGenerationHandler {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Command::Image { prompt } = Command::classify(&message.content) else {
            return Ok(HandlerResponse::Continue);
        };
        if prompt.trim().is_empty() {
            return Ok(send_reply(self.bot.as_ref(), message, HELP_TEXT).await);
        }
        Ok(self.handle_image_generation(message, &prompt).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dbot_core::{Chat, ChatType, DbotError, User};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockBot {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Bot for MockBot {
        async fn reply_to(&self, _message: &Message, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct MockImageClient {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MockImageClient {
        fn new(fail: bool) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl ImageGenerator for MockImageClient {
        async fn generate_image(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(DbotError::ImageGeneration("rate limited".to_string()));
            }
            Ok("https://images.example.com/fox.png".to_string())
        }
    }

    fn message(content: &str) -> Message {
        Message {
            id: "om_1".to_string(),
            event_id: "ev_1".to_string(),
            user: User {
                id: "ou_1".to_string(),
                open_id: None,
            },
            chat: Chat {
                id: "oc_1".to_string(),
                chat_type: ChatType::P2p,
            },
            content: content.to_string(),
            message_type: "text".to_string(),
            mentions: vec![],
            created_at: Utc::now(),
        }
    }

    fn setup(fail: bool) -> (Arc<MockImageClient>, Arc<MockBot>, ImageGenerationHandler) {
        let images = Arc::new(MockImageClient::new(fail));
        let bot = Arc::new(MockBot::default());
        let handler = ImageGenerationHandler::new(images.clone(), bot.clone());
        (images, bot, handler)
    }

    #[tokio::test]
    async fn test_sends_image_url() {
        let (images, bot, handler) = setup(false);

        let response = handler.handle(&message("/image a red fox")).await.unwrap();

        assert_eq!(
            response,
            HandlerResponse::Reply("https://images.example.com/fox.png".to_string())
        );
        assert_eq!(*images.prompts.lock().unwrap(), vec!["a red fox".to_string()]);
        assert_eq!(bot.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_sends_fixed_message() {
        let (_, bot, handler) = setup(true);

        handler.handle(&message("/image a red fox")).await.unwrap();

        assert_eq!(
            *bot.sent.lock().unwrap(),
            vec![MSG_GENERATION_FAILED.to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_prompt_sends_usage_without_api_call() {
        let (images, bot, handler) = setup(false);

        handler.handle(&message("/image   ")).await.unwrap();

        assert!(images.prompts.lock().unwrap().is_empty());
        assert_eq!(*bot.sent.lock().unwrap(), vec![HELP_TEXT.to_string()]);
    }

    #[tokio::test]
    async fn test_other_messages_continue() {
        let (images, bot, handler) = setup(false);

        for text in ["draw me a fox", "/help", "/clear"] {
            assert_eq!(
                handler.handle(&message(text)).await.unwrap(),
                HandlerResponse::Continue
            );
        }
        assert!(images.prompts.lock().unwrap().is_empty());
        assert!(bot.sent.lock().unwrap().is_empty());
    }
}
