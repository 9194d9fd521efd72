use dbot_core::{DbotError, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_FEISHU_API_BASE: &str = "https://open.feishu.cn/open-apis";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-2";
pub const DEFAULT_MAX_TOKEN: u32 = 1024;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_FILE: &str = "logs/feishu-bot.log";
pub const DEFAULT_DEDUP_TTL_SECS: u64 = 600;
pub const DEFAULT_DEDUP_CAPACITY: usize = 10_000;

/// Feishu bot configuration, loaded from environment variables once at startup.
///
/// Missing credentials load as empty strings; [`BotConfig::doctor`] reports them.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub feishu_app_id: String,
    pub feishu_app_secret: String,
    /// Display name the first group mention must match.
    pub feishu_bot_name: String,
    pub feishu_api_base: String,
    pub openai_api_key: String,
    pub openai_model: String,
    /// Both the completion `max_tokens` and the conversation window budget (in characters).
    pub openai_max_token: u32,
    pub openai_base_url: String,
    pub image_model: String,
    pub system_prompt: String,
    pub port: u16,
    pub log_file: String,
    pub dedup_ttl_secs: u64,
    pub dedup_capacity: usize,
}

impl BotConfig {
    /// Loads config from environment variables (call `dotenvy::dotenv()` first).
    /// A numeric variable that does not parse is a [`DbotError::Config`].
    pub fn load() -> Result<Self> {
        Ok(Self {
            feishu_app_id: env_or("APPID", ""),
            feishu_app_secret: env_or("SECRET", ""),
            feishu_bot_name: env_or("BOTNAME", ""),
            feishu_api_base: env_or("FEISHU_API_BASE", DEFAULT_FEISHU_API_BASE),
            openai_api_key: env_or("KEY", ""),
            openai_model: env_or("MODEL", DEFAULT_MODEL),
            openai_max_token: parse_env("MAX_TOKEN", DEFAULT_MAX_TOKEN)?,
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            image_model: env_or("IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            system_prompt: env_or("SYSTEM_PROMPT", prompt::DEFAULT_SYSTEM_MESSAGE),
            port: parse_env("PORT", DEFAULT_PORT)?,
            log_file: env_or("LOG_FILE", DEFAULT_LOG_FILE),
            dedup_ttl_secs: parse_env("DEDUP_TTL_SECS", DEFAULT_DEDUP_TTL_SECS)?,
            dedup_capacity: parse_env("DEDUP_CAPACITY", DEFAULT_DEDUP_CAPACITY)?,
        })
    }

    /// Conversation window budget in characters.
    pub fn window_budget(&self) -> usize {
        self.openai_max_token as usize
    }
}

/// Reads `name`; unset or blank values fall back to `default`.
fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|e| {
            DbotError::Config(format!("{} must be a number, got {:?}: {}", name, raw, e))
        }),
        _ => Ok(default),
    }
}
