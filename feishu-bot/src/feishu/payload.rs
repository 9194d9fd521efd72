//! Feishu event callback payloads (event schema 2.0).

use chrono::{DateTime, TimeZone, Utc};
use dbot_core::{
    strip_mentions, Chat, ChatType, DbotError, Mention, Message, Result, ToCoreMessage, User,
};
use serde::Deserialize;
use serde_json::Value;

pub const MESSAGE_RECEIVE_EVENT: &str = "im.message.receive_v1";

/// What a webhook body asks of us.
#[derive(Debug)]
pub enum Callback {
    /// Endpoint verification; echo the challenge back.
    UrlVerification { challenge: String },
    /// The app has an Encrypt Key configured, which this bot does not support.
    Encrypted,
    MessageReceived(Box<MessageReceiveEvent>),
    /// Any other event type; acknowledged and ignored.
    Other { event_type: Option<String> },
}

impl Callback {
    /// Classifies a parsed JSON body. Fails with [`DbotError::MalformedPayload`] when a message
    /// event does not have the expected shape.
    pub fn parse(body: Value) -> Result<Self> {
        if body.get("type").and_then(Value::as_str) == Some("url_verification") {
            let challenge = body
                .get("challenge")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Ok(Callback::UrlVerification { challenge });
        }
        if body.get("encrypt").is_some() {
            return Ok(Callback::Encrypted);
        }

        let event_type = body
            .pointer("/header/event_type")
            .and_then(Value::as_str)
            .map(str::to_string);
        match event_type.as_deref() {
            Some(MESSAGE_RECEIVE_EVENT) => {
                let event: MessageReceiveEvent = serde_json::from_value(body)
                    .map_err(|e| DbotError::MalformedPayload(e.to_string()))?;
                Ok(Callback::MessageReceived(Box::new(event)))
            }
            _ => Ok(Callback::Other { event_type }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageReceiveEvent {
    pub schema: Option<String>,
    pub header: EventHeader,
    pub event: MessageEventBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventHeader {
    pub event_id: String,
    pub event_type: String,
    pub create_time: Option<String>,
    pub app_id: Option<String>,
    pub tenant_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageEventBody {
    pub sender: EventSender,
    pub message: EventMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventSender {
    pub sender_id: SenderIds,
    pub sender_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SenderIds {
    pub user_id: Option<String>,
    pub open_id: Option<String>,
    pub union_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMessage {
    pub message_id: String,
    pub chat_id: String,
    pub chat_type: ChatType,
    pub message_type: String,
    /// JSON-encoded body; `{"text": "..."}` for text messages.
    pub content: String,
    #[serde(default)]
    pub mentions: Vec<EventMention>,
    /// Milliseconds since the epoch, as a string.
    pub create_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMention {
    pub key: String,
    pub name: String,
    pub id: Option<SenderIds>,
}

#[derive(Deserialize)]
struct TextContent {
    text: String,
}

impl MessageReceiveEvent {
    /// Sender id used for session keys: `user_id`, or `open_id` when the app lacks the user id scope.
    fn sender_id(&self) -> Option<&str> {
        let ids = &self.event.sender.sender_id;
        ids.user_id.as_deref().or(ids.open_id.as_deref())
    }

    /// Plain text of a text message with mention placeholders removed; empty for other types.
    fn text(&self) -> Result<String> {
        let message = &self.event.message;
        if message.message_type != "text" {
            return Ok(String::new());
        }
        let content: TextContent = serde_json::from_str(&message.content).map_err(|e| {
            DbotError::MalformedPayload(format!("text content is not valid JSON: {}", e))
        })?;
        Ok(strip_mentions(&content.text).trim().to_string())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.event
            .message
            .create_time
            .as_deref()
            .and_then(|ms| ms.parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_else(Utc::now)
    }
}

impl ToCoreMessage for MessageReceiveEvent {
    fn to_core(&self) -> Result<Message> {
        let sender_id = self
            .sender_id()
            .ok_or_else(|| DbotError::MalformedPayload("sender has no user_id or open_id".into()))?;
        let message = &self.event.message;

        Ok(Message {
            id: message.message_id.clone(),
            event_id: self.header.event_id.clone(),
            user: User {
                id: sender_id.to_string(),
                open_id: self.event.sender.sender_id.open_id.clone(),
            },
            chat: Chat {
                id: message.chat_id.clone(),
                chat_type: message.chat_type,
            },
            content: self.text()?,
            message_type: message.message_type.clone(),
            mentions: message
                .mentions
                .iter()
                .map(|m| Mention {
                    key: m.key.clone(),
                    name: m.name.clone(),
                })
                .collect(),
            created_at: self.created_at(),
        })
    }
}
