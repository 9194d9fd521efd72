//! # Core Types
//!
//! ## Turn
//!
//! One question/answer exchange. Its `size` is the character count of question plus answer
//! (Unicode scalar values, not tokens); it is computed once at construction and never changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single question/answer exchange in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    question: String,
    answer: String,
    size: usize,
    timestamp: DateTime<Utc>,
}

impl Turn {
    /// Creates a turn stamped with the current time.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self::with_timestamp(question, answer, Utc::now())
    }

    /// Creates a turn with an explicit timestamp (e.g. when restoring history).
    pub fn with_timestamp(
        question: impl Into<String>,
        answer: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let question = question.into();
        let answer = answer.into();
        let size = question.chars().count() + answer.chars().count();
        Self {
            question,
            answer,
            size,
            timestamp,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// `len(question) + len(answer)` in characters.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// `(question, answer)` view, as consumed by `prompt::build_conversation`.
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.question, &self.answer)
    }
}
