//! Unit test module
//!
//! Handler unit tests live here, separate from source files.
//! Tests interact with handlers via public and pub(crate) APIs.


use async_trait::async_trait;
use chrono::Utc;
use dbot_core::{Bot, Chat, ChatType, DbotError, Mention, Message, Result, User};
use std::sync::Mutex;

/// Records every reply; optionally fails delivery.
#[derive(Default)]
pub(crate) struct MockBot {
    pub sent: Mutex<Vec<String>>,
    pub fail: bool,
}

impl MockBot {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn reply_to(&self, _message: &Message, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(DbotError::Delivery("mock failure".to_string()));
        }
        Ok(())
    }
}

pub(crate) fn sample_message(chat_type: ChatType, content: &str) -> Message {
    Message {
        id: "om_1".to_string(),
        event_id: "ev_1".to_string(),
        user: User {
            id: "ou_user".to_string(),
            open_id: Some("ou_user".to_string()),
        },
        chat: Chat {
            id: "oc_chat".to_string(),
            chat_type,
        },
        content: content.to_string(),
        message_type: "text".to_string(),
        mentions: vec![],
        created_at: Utc::now(),
    }
}

pub(crate) fn mention(name: &str) -> Mention {
    Mention {
        key: "@_user_1".to_string(),
        name: name.to_string(),
    }
}
