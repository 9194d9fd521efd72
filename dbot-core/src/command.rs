//! Slash-command classification.
//!
//! A message is either one of the structured commands (`/help`, `/clear`, `/image <prompt>`)
//! or free-form chat. Any other `/...` text falls back to help.

/// Prefix of the image generation command; the rest of the text is the prompt.
pub const IMAGE_COMMAND_PREFIX: &str = "/image";
pub const HELP_COMMAND: &str = "/help";
pub const CLEAR_COMMAND: &str = "/clear";

/// Usage message sent for `/help`, unknown commands and `/image` without a prompt.
pub const HELP_TEXT: &str = "ChatGPT 指令使用指南\n\nUsage:\n    /clear    清除上下文\n    /help     获取更多帮助\n    /image [提示词]  根据提示词生成图片";

const COMMAND_PREFIX: char = '/';
const MENTION_USER_PREFIX: &str = "@_user_";
const MENTION_ALL: &str = "@_all";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Image { prompt: String },
    Chat { question: String },
}

impl Command {
    /// Classifies raw message text. Mention placeholders are removed first so `@bot /clear` is a command.
    ///
    /// Precedence: `/image` prefix, `/help`, `/clear`, any other `/` text (help), chat.
    pub fn classify(raw_text: &str) -> Self {
        let stripped = strip_mentions(raw_text);
        let text = stripped.trim();

        if let Some(rest) = text.strip_prefix(IMAGE_COMMAND_PREFIX) {
            return Command::Image {
                prompt: rest.trim_start().to_string(),
            };
        }
        if text == HELP_COMMAND {
            return Command::Help;
        }
        if text == CLEAR_COMMAND {
            return Command::Clear;
        }
        if text.starts_with(COMMAND_PREFIX) {
            return Command::Help;
        }
        Command::Chat {
            question: text.to_string(),
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Clear => "clear",
            Command::Image { .. } => "image",
            Command::Chat { .. } => "chat",
        }
    }
}

/// Removes Feishu mention placeholders (`@_user_1`, `@_user_2`, ..., `@_all`) from text.
/// Surrounding whitespace is kept; callers trim.
pub fn strip_mentions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('@') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix(MENTION_USER_PREFIX) {
            let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits > 0 {
                rest = &after[digits..];
                continue;
            }
        } else if let Some(after) = tail.strip_prefix(MENTION_ALL) {
            rest = after;
            continue;
        }
        out.push('@');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}
