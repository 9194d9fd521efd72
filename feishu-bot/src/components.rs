//! Component factory: builds BotComponents from config and assembles the handler chain.
//! Isolates assembly logic from runner.

use dbot_core::Bot;
use handler_chain::HandlerChain;
use handlers::{
    CommandHandler, EventDeduplicator, LoggingHandler, MentionGateHandler, TextOnlyHandler,
};
use image_generation_client::{ImageGenerationClient, ImageGenerator};
use image_handlers::ImageGenerationHandler;
use llm_client::{LlmClient, OpenAILlmClient};
use llm_handlers::ChatHandler;
use memory::{ConversationStore, InMemoryConversationStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use crate::config::BotConfig;
use crate::feishu::FeishuBot;

/// Collaborators shared by the handlers. Fields are public so tests can substitute mocks.
#[derive(Clone)]
pub struct BotComponents {
    pub config: Arc<BotConfig>,
    pub bot: Arc<dyn Bot>,
    pub store: Arc<dyn ConversationStore>,
    pub llm_client: Arc<dyn LlmClient>,
    pub image_client: Arc<dyn ImageGenerator>,
    pub dedup: EventDeduplicator,
}

/// Builds production components: Feishu reply client, OpenAI clients and an in-memory store.
#[instrument(skip(config))]
pub fn build_bot_components(config: Arc<BotConfig>) -> BotComponents {
    let bot: Arc<dyn Bot> = Arc::new(FeishuBot::new(
        config.feishu_app_id.clone(),
        config.feishu_app_secret.clone(),
        config.feishu_api_base.clone(),
    ));

    let llm_client: Arc<dyn LlmClient> = Arc::new(
        OpenAILlmClient::with_base_url(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
        )
        .with_model(config.openai_model.clone())
        .with_max_tokens(config.openai_max_token),
    );

    let image_client: Arc<dyn ImageGenerator> = Arc::new(
        ImageGenerationClient::with_base_url(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
        )
        .with_model(config.image_model.clone()),
    );

    let dedup = EventDeduplicator::new(
        Duration::from_secs(config.dedup_ttl_secs),
        config.dedup_capacity,
    );

    info!(
        model = %config.openai_model,
        image_model = %config.image_model,
        max_token = config.openai_max_token,
        openai_base_url = %config.openai_base_url,
        api_key = %openai_client::mask_token(&config.openai_api_key),
        dedup_ttl_secs = config.dedup_ttl_secs,
        dedup_capacity = config.dedup_capacity,
        "Bot components built"
    );

    BotComponents {
        config,
        bot,
        store: Arc::new(InMemoryConversationStore::new()),
        llm_client,
        image_client,
        dedup,
    }
}

/// Chain order: logging, mention gate, text-only, commands, image, chat. Dedup happens in the
/// webhook before the chain runs.
pub fn build_handler_chain(components: &BotComponents) -> HandlerChain {
    let config = &components.config;
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(MentionGateHandler::new(
            config.feishu_bot_name.clone(),
        )))
        .add_handler(Arc::new(TextOnlyHandler::new(components.bot.clone())))
        .add_handler(Arc::new(CommandHandler::new(
            components.store.clone(),
            components.bot.clone(),
        )))
        .add_handler(Arc::new(ImageGenerationHandler::new(
            components.image_client.clone(),
            components.bot.clone(),
        )))
        .add_handler(Arc::new(ChatHandler::new(
            components.llm_client.clone(),
            components.store.clone(),
            components.bot.clone(),
            config.system_prompt.clone(),
            config.window_budget(),
        )))
}
