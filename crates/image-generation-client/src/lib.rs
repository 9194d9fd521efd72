//! OpenAI image generation client.
//!
//! Text-to-image through the OpenAI images API; one 1024x1024 image per prompt, returned as a URL.

use async_openai::{
    config::OpenAIConfig,
    types::{CreateImageRequestArgs, Image, ImageModel, ImageSize, ImageResponseFormat},
    Client,
};
use async_trait::async_trait;
use dbot_core::{DbotError, Result};
use openai_client::mask_token;
use std::sync::Arc;

pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-2";

fn image_model(name: &str) -> ImageModel {
    match name {
        "dall-e-2" => ImageModel::DallE2,
        "dall-e-3" => ImageModel::DallE3,
        other => ImageModel::Other(other.to_string()),
    }
}

/// Image generation interface used by the `/image` command.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates one image for `prompt` and returns its URL.
    /// Failures are reported as [`DbotError::ImageGeneration`].
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}

/// OpenAI images client.
#[derive(Clone)]
pub struct ImageGenerationClient {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    size: ImageSize,
    api_key_for_logging: Option<String>,
}

impl ImageGenerationClient {
    pub fn new(api_key: String) -> Self {
        let api_key_for_logging = Some(api_key.clone());
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self::from_config(config, api_key_for_logging)
    }

    /// Uses a custom base URL (for OpenAI-compatible services).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let api_key_for_logging = Some(api_key.clone());
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self::from_config(config, api_key_for_logging)
    }

    fn from_config(config: OpenAIConfig, api_key_for_logging: Option<String>) -> Self {
        Self {
            client: Arc::new(Client::with_config(config)),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            size: ImageSize::S1024x1024,
            api_key_for_logging,
        }
    }

    /// Sets the model (dall-e-2 or dall-e-3).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request_image(&self, prompt: &str) -> std::result::Result<String, String> {
        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(image_model(&self.model))
            .size(self.size)
            .response_format(ImageResponseFormat::Url)
            .n(1)
            .build()
            .map_err(|e| e.to_string())?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI image generation request JSON");
        }

        let response = self
            .client
            .images()
            .create(request)
            .await
            .map_err(|e| e.to_string())?;

        response
            .data
            .first()
            .and_then(|image| match image.as_ref() {
                Image::Url { url, .. } => Some(url.clone()),
                _ => None,
            })
            .ok_or_else(|| "No image URL in response".to_string())
    }
}

#[async_trait]
impl ImageGenerator for ImageGenerationClient {
    #[tracing::instrument(skip(self), fields(model = %self.model))]
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let masked = self
            .api_key_for_logging
            .as_deref()
            .map(mask_token)
            .unwrap_or_else(|| "***".to_string());

        tracing::info!(
            size = ?self.size,
            prompt_preview = %prompt.chars().take(100).collect::<String>(),
            api_key = %masked,
            "OpenAI image generation request"
        );

        let url = self
            .request_image(prompt)
            .await
            .map_err(DbotError::ImageGeneration)?;
        tracing::info!(image_url = %url, "OpenAI image generation completed");
        Ok(url)
    }
}
