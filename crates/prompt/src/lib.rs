//! # Prompt
//!
//! Assembles the role-tagged message list sent to the chat completion API.
//!
//! ## Format
//!
//! - **System**: one leading instruction message
//! - **History**: for each past turn, oldest first, a `user` message (question) then an
//!   `assistant` message (answer)
//! - **Question**: the current question as the final `user` message
//!
//! ## External interactions
//!
//! - **AI models**: output is converted to OpenAI Chat Completions `messages` by llm-client.

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Default system instruction when no custom system message is configured.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

/// Builds the message list for one completion request.
///
/// Produces `1 + 2 * history.len() + 1` messages: system, then user/assistant per past
/// exchange in the given order, then `current_question` as user. Pure; no side effects.
///
/// # Arguments
///
/// * `system_message` - Leading instruction (see [`DEFAULT_SYSTEM_MESSAGE`])
/// * `history` - Past `(question, answer)` pairs, oldest first
/// * `current_question` - The new user question (last message)
pub fn build_conversation<H, Q, A>(
    system_message: &str,
    history: H,
    current_question: &str,
) -> Vec<ChatMessage>
where
    H: IntoIterator<Item = (Q, A)>,
    Q: AsRef<str>,
    A: AsRef<str>,
{
    let history = history.into_iter();
    let (lower, _) = history.size_hint();
    let mut messages = Vec::with_capacity(2 + 2 * lower);

    messages.push(ChatMessage::system(system_message));
    for (question, answer) in history {
        messages.push(ChatMessage::user(question.as_ref()));
        messages.push(ChatMessage::assistant(answer.as_ref()));
    }
    messages.push(ChatMessage::user(current_question));
    messages
}
