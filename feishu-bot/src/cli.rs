//! CLI parser and config loading.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::BotConfig;

#[derive(Parser)]
#[command(name = "feishu-bot")]
#[command(about = "Feishu LLM bot", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the webhook (config from env; port can override PORT).
    Run {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check the configuration and print the report as JSON.
    Doctor,
}

/// Load BotConfig from environment. If `port` is provided it overrides PORT.
pub fn load_config(port: Option<u16>) -> Result<BotConfig> {
    let mut config = BotConfig::load()?;
    if let Some(port) = port {
        config.port = port;
    }
    Ok(config)
}
