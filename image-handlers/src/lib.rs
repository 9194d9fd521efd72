//! `/image <prompt>` handler.

mod image_generation_handler;

pub use image_generation_handler::{ImageGenerationHandler, MSG_GENERATION_FAILED};
