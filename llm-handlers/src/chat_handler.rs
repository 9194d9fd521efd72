//! Free-form chat: the session's history window plus the new question go to the model; a
//! successful answer becomes a new turn and the window is trimmed back under budget.

use async_trait::async_trait;
use dbot_core::{send_reply, Bot, Command, DbotError, Handler, HandlerResponse, Message, Result};
use llm_client::LlmClient;
use memory::{ConversationStore, Turn};
use prompt::build_conversation;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Reply when the completion call fails. Nothing is stored in that case.
pub const APOLOGY_MESSAGE: &str = "抱歉，我遇到了一些问题，请稍后再试。";

#[derive(Clone)]
pub struct ChatHandler {
    llm_client: Arc<dyn LlmClient>,
    store: Arc<dyn ConversationStore>,
    bot: Arc<dyn Bot>,
    system_message: String,
    /// Window budget in characters.
    budget: usize,
}

impl ChatHandler {
    pub fn new(
        llm_client: Arc<dyn LlmClient>,
        store: Arc<dyn ConversationStore>,
        bot: Arc<dyn Bot>,
        system_message: impl Into<String>,
        budget: usize,
    ) -> Self {
        Self {
            llm_client,
            store,
            bot,
            system_message: system_message.into(),
            budget,
        }
    }

    async fn answer(&self, message: &Message, question: &str) -> HandlerResponse {
        let session_id = message.session_id();

        let history = match self
            .store
            .get_all(&session_id)
            .await
            .map_err(|e| DbotError::Storage(e.to_string()))
        {
            Ok(turns) => turns,
            Err(e) => {
                // Answer without context rather than not at all.
                warn!(error = %e, session_id = %session_id, "Failed to load history");
                Vec::new()
            }
        };
        let messages = build_conversation(
            &self.system_message,
            history.iter().map(Turn::as_pair),
            question,
        );
        info!(
            session_id = %session_id,
            history_turns = history.len(),
            message_count = messages.len(),
            "Requesting completion"
        );

        let answer = match self.llm_client.complete(messages).await {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            Ok(_) => {
                error!(session_id = %session_id, "Completion returned blank content");
                return send_reply(self.bot.as_ref(), message, APOLOGY_MESSAGE).await;
            }
            Err(e) => {
                error!(error = %e, session_id = %session_id, "Completion failed");
                return send_reply(self.bot.as_ref(), message, APOLOGY_MESSAGE).await;
            }
        };

        match self
            .store
            .commit_turn(&session_id, Turn::new(question, answer.as_str()), self.budget)
            .await
            .map_err(|e| DbotError::Storage(e.to_string()))
        {
            Ok(window) => info!(
                session_id = %session_id,
                window_turns = window.len(),
                "Turn committed"
            ),
            Err(e) => error!(error = %e, session_id = %session_id, "Failed to store turn"),
        }

        send_reply(self.bot.as_ref(), message, &answer).await
    }
}

#[async_trait]
impl Handler for ChatHandler {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        match Command::classify(&message.content) {
            Command::Chat { question } if !question.is_empty() => {
                Ok(self.answer(message, &question).await)
            }
            Command::Chat { .. } => {
                info!(message_id = %message.id, "Empty question ignored");
                Ok(HandlerResponse::Stop)
            }
            _ => Ok(HandlerResponse::Continue),
        }
    }
}
