//! OpenAI-backed [`LlmClient`]: converts prompt messages and caps the reply with `max_tokens`.

use async_trait::async_trait;
use dbot_core::{DbotError, Result};
use prompt::ChatMessage;
use tracing::instrument;

use super::{chat_message_to_openai, LlmClient};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// [`LlmClient`] implementation on top of openai-client.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAILlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::new(api_key),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::with_base_url(api_key, base_url),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages), fields(model = %self.model))]
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let openai_messages = messages
            .iter()
            .map(chat_message_to_openai)
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(|e| DbotError::Completion(e.to_string()))?;

        self.client
            .chat_completion(&self.model, openai_messages, self.max_tokens)
            .await
            .map_err(|e| DbotError::Completion(e.to_string()))
    }
}
