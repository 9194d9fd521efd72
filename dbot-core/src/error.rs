//! Error types for the bot core.
//!
//! [`DbotError`] covers every failure the bot reports; [`Result`] is the shared alias.

use thiserror::Error;

/// Top-level error: external collaborators (completion, image, delivery), inbound payloads,
/// conversation storage, config and IO.
#[derive(Error, Debug)]
pub enum DbotError {
    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Image generation error: {0}")]
    ImageGeneration(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations; uses [`DbotError`].
pub type Result<T> = std::result::Result<T, DbotError>;
