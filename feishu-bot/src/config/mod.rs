//! Bot configuration: env loading and the startup self-check.

mod bot_config;
mod doctor;


pub use bot_config::BotConfig;
pub use doctor::{DoctorMeta, DoctorReport, LocalizedMessage};
