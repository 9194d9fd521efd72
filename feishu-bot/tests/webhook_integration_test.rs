//! End-to-end webhook tests: Feishu callback JSON in, replies recorded by a mock bot.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use dbot_core::{Bot, DbotError, Message, Result, HELP_TEXT};
use feishu_bot::{build_handler_chain, build_router, AppState, BotComponents, BotConfig};
use handlers::{EventDeduplicator, CLEAR_CONFIRMATION, UNSUPPORTED_MESSAGE_TYPE};
use image_generation_client::ImageGenerator;
use llm_client::LlmClient;
use memory::{ConversationStore, InMemoryConversationStore};
use prompt::ChatMessage;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingBot {
    replies: Mutex<Vec<(String, String)>>,
}

impl RecordingBot {
    fn texts(&self) -> Vec<String> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((message.id.clone(), text.to_string()));
        Ok(())
    }
}

/// Answers "echo: <last user message>" and records how many messages each prompt had.
#[derive(Default)]
struct EchoLlm {
    prompt_sizes: Mutex<Vec<usize>>,
}

#[async_trait]
impl LlmClient for EchoLlm {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.prompt_sizes.lock().unwrap().push(messages.len());
        let last = messages
            .last()
            .map(|m| m.content.clone())
            .ok_or_else(|| DbotError::Completion("empty prompt".to_string()))?;
        Ok(format!("echo: {}", last))
    }
}

struct FixedImage;

#[async_trait]
impl ImageGenerator for FixedImage {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        Ok(format!("https://images.example.com/{}.png", prompt.replace(' ', "-")))
    }
}

struct Harness {
    app: Router,
    bot: Arc<RecordingBot>,
    llm: Arc<EchoLlm>,
    store: Arc<InMemoryConversationStore>,
}

fn test_config() -> BotConfig {
    BotConfig {
        feishu_app_id: "cli_test".to_string(),
        feishu_app_secret: "secret".to_string(),
        feishu_bot_name: "GPT".to_string(),
        feishu_api_base: "http://127.0.0.1:1".to_string(),
        openai_api_key: "sk-test".to_string(),
        openai_model: "gpt-3.5-turbo".to_string(),
        openai_max_token: 1024,
        openai_base_url: "http://127.0.0.1:1".to_string(),
        image_model: "dall-e-2".to_string(),
        system_prompt: "You are a test assistant.".to_string(),
        port: 0,
        log_file: "logs/test.log".to_string(),
        dedup_ttl_secs: 600,
        dedup_capacity: 100,
    }
}

fn harness() -> Harness {
    let bot = Arc::new(RecordingBot::default());
    let llm = Arc::new(EchoLlm::default());
    let store = Arc::new(InMemoryConversationStore::new());

    let components = BotComponents {
        config: Arc::new(test_config()),
        bot: bot.clone(),
        store: store.clone(),
        llm_client: llm.clone(),
        image_client: Arc::new(FixedImage),
        dedup: EventDeduplicator::new(Duration::from_secs(600), 100),
    };
    let chain = build_handler_chain(&components);

    Harness {
        app: build_router(Arc::new(AppState::new(chain, components.dedup.clone()))),
        bot,
        llm,
        store,
    }
}

fn event(
    event_id: &str,
    chat_type: &str,
    message_type: &str,
    content: &str,
    mentions: Value,
) -> Value {
    json!({
        "schema": "2.0",
        "header": {
            "event_id": event_id,
            "event_type": "im.message.receive_v1",
            "create_time": "1608725989000",
            "token": "rvaYgkR9Rnq6bEtSd46hvh3RUsCLvYJ6",
            "app_id": "cli_test",
            "tenant_key": "736588c9260f175e"
        },
        "event": {
            "sender": {
                "sender_id": {
                    "union_id": "on_8ed6aa67826108097d9ee143816345",
                    "user_id": "e33ggbyz",
                    "open_id": "ou_84aad35d084aa403a838cf73ee18467"
                },
                "sender_type": "user",
                "tenant_key": "736588c9260f175e"
            },
            "message": {
                "message_id": format!("om_{}", event_id),
                "create_time": "1609073151345",
                "chat_id": "oc_5ce6d572455d361153b7xx51da133945",
                "chat_type": chat_type,
                "message_type": message_type,
                "content": content,
                "mentions": mentions
            }
        }
    })
}

fn text(chat_type: &str, event_id: &str, text: &str) -> Value {
    event(
        event_id,
        chat_type,
        "text",
        &json!({ "text": text }).to_string(),
        json!([]),
    )
}

fn group_mention(event_id: &str, name: &str, text: &str) -> Value {
    event(
        event_id,
        "group",
        "text",
        &json!({ "text": format!("@_user_1 {}", text) }).to_string(),
        json!([{
            "key": "@_user_1",
            "id": {"open_id": "ou_bot"},
            "name": name,
            "tenant_key": "736588c9260f175e"
        }]),
    )
}

async fn post(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

const SESSION: &str = "oc_5ce6d572455d361153b7xx51da133945e33ggbyz";

#[tokio::test]
async fn test_p2p_chat_replies_and_remembers() {
    let h = harness();

    let (status, body) = post(&h.app, text("p2p", "ev1", "hello")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"code": 0}));

    let (_, _) = post(&h.app, text("p2p", "ev2", "again")).await;

    assert_eq!(h.bot.texts(), vec!["echo: hello", "echo: again"]);
    let turns = h.store.get_all(SESSION).await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].as_pair(), ("hello", "echo: hello"));
    // system + user, then system + (user, assistant) + user.
    assert_eq!(*h.llm.prompt_sizes.lock().unwrap(), vec![2, 4]);
}

#[tokio::test]
async fn test_clear_command_empties_session() {
    let h = harness();
    post(&h.app, text("p2p", "ev1", "remember me")).await;

    post(&h.app, text("p2p", "ev2", "/clear")).await;

    assert_eq!(h.bot.texts().last().unwrap(), CLEAR_CONFIRMATION);
    assert!(h.store.get_all(SESSION).await.unwrap().is_empty());

    post(&h.app, text("p2p", "ev3", "fresh start")).await;
    assert_eq!(h.llm.prompt_sizes.lock().unwrap().last(), Some(&2));
}

#[tokio::test]
async fn test_help_command() {
    let h = harness();
    post(&h.app, text("p2p", "ev1", "/help")).await;
    assert_eq!(h.bot.texts(), vec![HELP_TEXT]);
}

#[tokio::test]
async fn test_image_command_replies_with_url() {
    let h = harness();
    post(&h.app, text("p2p", "ev1", "/image a red fox")).await;

    assert_eq!(
        h.bot.texts(),
        vec!["https://images.example.com/a-red-fox.png"]
    );
    assert!(h.store.get_all(SESSION).await.unwrap().is_empty());
    assert!(h.llm.prompt_sizes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_group_message_requires_mention_of_bot() {
    let h = harness();

    let (status, body) = post(&h.app, text("group", "ev1", "anyone here?")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"code": 0}));

    post(&h.app, group_mention("ev2", "SomeoneElse", "hi")).await;
    assert!(h.bot.texts().is_empty());

    post(&h.app, group_mention("ev3", "GPT", "hi bot")).await;
    assert_eq!(h.bot.texts(), vec!["echo: hi bot"]);
}

#[tokio::test]
async fn test_topic_group_message_is_ignored() {
    let h = harness();

    let (status, body) = post(&h.app, text("topic_group", "ev1", "not for the bot")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"code": 0}));
    assert!(h.bot.texts().is_empty());
    assert!(h.llm.prompt_sizes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_event_is_processed_once() {
    let h = harness();
    let body = text("p2p", "ev-dup", "only once");

    let (_, first) = post(&h.app, body.clone()).await;
    let (status, second) = post(&h.app, body).await;

    assert_eq!(first, json!({"code": 0}));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second, json!({"code": 1}));
    assert_eq!(h.bot.texts(), vec!["echo: only once"]);
    assert_eq!(h.store.get_all(SESSION).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_text_message_gets_notice() {
    let h = harness();
    post(
        &h.app,
        event(
            "ev1",
            "p2p",
            "image",
            r#"{"image_key":"img_v2_xxx"}"#,
            json!([]),
        ),
    )
    .await;

    assert_eq!(h.bot.texts(), vec![UNSUPPORTED_MESSAGE_TYPE]);
    assert!(h.llm.prompt_sizes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_url_verification_through_full_app() {
    let h = harness();
    let (_, body) = post(
        &h.app,
        json!({"challenge": "c-123", "token": "t", "type": "url_verification"}),
    )
    .await;
    assert_eq!(body, json!({"challenge": "c-123"}));
}
