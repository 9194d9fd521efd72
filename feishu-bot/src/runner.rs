use anyhow::{Context, Result};
use dbot_core::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::components::{build_bot_components, build_handler_chain};
use crate::config::BotConfig;
use crate::routes::{build_router, AppState};

/// Main entry: init logging, run the self-check, build components and the handler chain, then
/// serve the webhook until Ctrl-C.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    init_tracing(&config.log_file)?;

    let report = config.doctor();
    if report.is_ok() {
        info!(meta = ?report.meta, "Self-check passed");
    } else {
        warn!(
            code = report.code,
            zh_cn = %report.message.zh_cn,
            en_us = %report.message.en_us,
            "Self-check failed"
        );
    }

    let config = Arc::new(config);
    let components = build_bot_components(config.clone());
    let handler_chain = build_handler_chain(&components);
    let app = build_router(Arc::new(AppState::new(
        handler_chain,
        components.dedup.clone(),
    )));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Server is running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
