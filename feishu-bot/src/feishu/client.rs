//! Feishu Open API client implementing [`Bot`]: replies to a message in its thread.

use async_trait::async_trait;
use dbot_core::{Bot, DbotError, Message, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Refresh the tenant token this long before it actually expires.
const TOKEN_REFRESH_MARGIN_SECS: u64 = 300;
const DEFAULT_TOKEN_EXPIRE_SECS: u64 = 7200;

#[derive(Debug, Deserialize)]
struct TenantAccessTokenResponse {
    code: i32,
    msg: String,
    tenant_access_token: Option<String>,
    expire: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i32,
    msg: String,
}

struct TokenCache {
    token: String,
    expires_at: Instant,
}

/// Replies through `POST /im/v1/messages/{message_id}/reply`, authenticated with a cached
/// tenant access token.
#[derive(Clone)]
pub struct FeishuBot {
    app_id: String,
    app_secret: String,
    api_base: String,
    client: reqwest::Client,
    token_cache: Arc<RwLock<Option<TokenCache>>>,
}

impl FeishuBot {
    pub fn new(app_id: String, app_secret: String, api_base: String) -> Self {
        Self {
            app_id,
            app_secret,
            api_base: api_base.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Returns the cached tenant access token, refreshing it when close to expiry.
    async fn tenant_access_token(&self) -> anyhow::Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.expires_at > Instant::now() + Duration::from_secs(TOKEN_REFRESH_MARGIN_SECS) {
                    return Ok(cached.token.clone());
                }
            }
        }

        let url = self.api_url("/auth/v3/tenant_access_token/internal");
        let body = serde_json::json!({
            "app_id": self.app_id,
            "app_secret": self.app_secret
        });
        let resp = self.client.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Failed to get Feishu access token ({status}): {text}");
        }

        let data: TenantAccessTokenResponse = resp.json().await?;
        if data.code != 0 {
            anyhow::bail!("Feishu token error ({}): {}", data.code, data.msg);
        }
        let token = data
            .tenant_access_token
            .ok_or_else(|| anyhow::anyhow!("Missing tenant_access_token in response"))?;
        let expire = data.expire.unwrap_or(DEFAULT_TOKEN_EXPIRE_SECS);

        *self.token_cache.write().await = Some(TokenCache {
            token: token.clone(),
            expires_at: Instant::now() + Duration::from_secs(expire),
        });
        debug!(expire_secs = expire, "Feishu tenant access token refreshed");
        Ok(token)
    }

    /// Sends `text` as a text reply to `message_id`.
    pub async fn reply_text(&self, message_id: &str, text: &str) -> anyhow::Result<()> {
        let token = self.tenant_access_token().await?;
        let url = self.api_url(&format!("/im/v1/messages/{}/reply", message_id));
        let body = serde_json::json!({
            "msg_type": "text",
            "content": serde_json::json!({ "text": text }).to_string(),
        });

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Feishu reply failed ({status}): {text}");
        }

        let data: ApiResponse = resp.json().await?;
        if data.code != 0 {
            anyhow::bail!("Feishu reply error ({}): {}", data.code, data.msg);
        }
        Ok(())
    }
}

#[async_trait]
impl Bot for FeishuBot {
    #[instrument(skip(self, message, text), fields(message_id = %message.id))]
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.reply_text(&message.id, text)
            .await
            .map_err(|e| DbotError::Delivery(e.to_string()))?;
        info!(reply_len = text.chars().count(), "Reply sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dbot_core::{Chat, ChatType, User};
    use mockito::Matcher;
    use serde_json::json;

    const TOKEN_PATH: &str = "/auth/v3/tenant_access_token/internal";
    const REPLY_PATH: &str = "/im/v1/messages/om_1/reply";

    fn message() -> Message {
        Message {
            id: "om_1".to_string(),
            event_id: "ev_1".to_string(),
            user: User {
                id: "u1".to_string(),
                open_id: None,
            },
            chat: Chat {
                id: "oc_1".to_string(),
                chat_type: ChatType::P2p,
            },
            content: "hi".to_string(),
            message_type: "text".to_string(),
            mentions: vec![],
            created_at: Utc::now(),
        }
    }

    fn bot(server: &mockito::Server) -> FeishuBot {
        FeishuBot::new("cli_test".to_string(), "secret".to_string(), server.url())
    }

    #[tokio::test]
    async fn test_reply_fetches_token_and_posts_text() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server
            .mock("POST", TOKEN_PATH)
            .match_body(Matcher::PartialJson(
                json!({"app_id": "cli_test", "app_secret": "secret"}),
            ))
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":0,"msg":"ok","tenant_access_token":"t-abc","expire":7200}"#)
            .expect(1)
            .create_async()
            .await;
        let reply_mock = server
            .mock("POST", REPLY_PATH)
            .match_header("authorization", "Bearer t-abc")
            .match_body(Matcher::PartialJson(json!({
                "msg_type": "text",
                "content": "{\"text\":\"hello\"}"
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":0,"msg":"success","data":{}}"#)
            .expect(2)
            .create_async()
            .await;

        let bot = bot(&server);
        bot.reply_to(&message(), "hello").await.unwrap();
        bot.reply_to(&message(), "hello").await.unwrap();

        // Second reply reused the cached token.
        token_mock.assert_async().await;
        reply_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_error_is_delivery_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", TOKEN_PATH)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":10003,"msg":"invalid param"}"#)
            .create_async()
            .await;

        let err = bot(&server).reply_to(&message(), "hello").await.unwrap_err();

        assert!(matches!(err, DbotError::Delivery(ref msg) if msg.contains("10003")));
    }

    #[tokio::test]
    async fn test_reply_api_error_is_delivery_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", TOKEN_PATH)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":0,"msg":"ok","tenant_access_token":"t-abc","expire":7200}"#)
            .create_async()
            .await;
        server
            .mock("POST", REPLY_PATH)
            .with_status(400)
            .with_body(r#"{"code":230002,"msg":"Bot is not in the chat"}"#)
            .create_async()
            .await;

        let err = bot(&server).reply_to(&message(), "hello").await.unwrap_err();

        assert!(matches!(err, DbotError::Delivery(_)));
    }

    #[tokio::test]
    async fn test_short_lived_token_is_refreshed() {
        let mut server = mockito::Server::new_async().await;
        // Expiry inside the refresh margin forces a fetch on every call.
        let token_mock = server
            .mock("POST", TOKEN_PATH)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":0,"msg":"ok","tenant_access_token":"t-abc","expire":60}"#)
            .expect(2)
            .create_async()
            .await;
        server
            .mock("POST", REPLY_PATH)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":0,"msg":"success"}"#)
            .create_async()
            .await;

        let bot = bot(&server);
        bot.reply_to(&message(), "one").await.unwrap();
        bot.reply_to(&message(), "two").await.unwrap();

        token_mock.assert_async().await;
    }
}
