//! Binary for the Feishu bot.

use anyhow::Result;
use clap::Parser;
use feishu_bot::{load_config, run_bot, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { port } => {
            let config = load_config(port)?;
            run_bot(config).await
        }
        Commands::Doctor => {
            let config = load_config(None)?;
            let report = config.doctor();
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_ok() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
