//! # Feishu bot application
//!
//! Receives Feishu event callbacks over HTTP, runs them through the handler chain
//! (dedup, then mention gate → text-only → commands → image → chat) and replies through the
//! Feishu Open API. Config comes from env; see [`BotConfig`].

pub mod cli;
pub mod components;
pub mod config;
pub mod feishu;
pub mod routes;
pub mod runner;

pub use cli::{load_config, Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, BotComponents};
pub use config::{BotConfig, DoctorMeta, DoctorReport, LocalizedMessage};
pub use feishu::{Callback, FeishuBot, MessageReceiveEvent};
pub use routes::{build_router, AppState};
pub use runner::run_bot;
