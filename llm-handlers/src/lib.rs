mod chat_handler;

pub use chat_handler::{ChatHandler, APOLOGY_MESSAGE};
