//! HTTP routes: the Feishu event callback endpoint and a health check.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use dbot_core::{DbotError, ToCoreMessage};
use handler_chain::HandlerChain;
use handlers::EventDeduplicator;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::LocalizedMessage;
use crate::feishu::Callback;

/// Shared state for the HTTP server.
pub struct AppState {
    pub handler_chain: HandlerChain,
    /// Event ids already accepted; redeliveries are answered without running the chain.
    pub dedup: EventDeduplicator,
}

impl AppState {
    pub fn new(handler_chain: HandlerChain, dedup: EventDeduplicator) -> Self {
        Self {
            handler_chain,
            dedup,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ChallengeResponse {
    challenge: String,
}

#[derive(Debug, Serialize)]
struct CodeResponse {
    code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<LocalizedMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CodeResponse {
    fn ok() -> Self {
        Self {
            code: 0,
            message: None,
            error: None,
        }
    }

    fn failed(error: Option<String>) -> Self {
        Self {
            code: 1,
            message: None,
            error,
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: "feishu-bot",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Feishu event callback. Message events are deduplicated by event id, then processed to
/// completion before answering.
async fn webhook(State(state): State<Arc<AppState>>, body: Bytes) -> axum::response::Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            let err = DbotError::MalformedPayload(e.to_string());
            warn!(error = %err, body_len = body.len(), "Webhook body is not JSON");
            return (
                StatusCode::BAD_REQUEST,
                Json(CodeResponse::failed(Some(err.to_string()))),
            )
                .into_response();
        }
    };

    let callback = match Callback::parse(payload) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Malformed event dropped");
            return Json(CodeResponse::failed(None)).into_response();
        }
    };

    match callback {
        Callback::UrlVerification { challenge } => {
            info!("URL verification");
            Json(ChallengeResponse { challenge }).into_response()
        }
        Callback::Encrypted => {
            warn!("Encrypt Key is enabled for this app; events cannot be read");
            Json(CodeResponse {
                code: 1,
                message: Some(LocalizedMessage::new(
                    "你配置了 Encrypt Key，请关闭该功能。",
                    "You have open Encrypt Key Feature, please close it.",
                )),
                error: None,
            })
            .into_response()
        }
        Callback::MessageReceived(event) => {
            let message = match event.to_core() {
                Ok(m) => m,
                Err(e) => {
                    warn!(error = %e, event_id = %event.header.event_id, "Malformed message event dropped");
                    return Json(CodeResponse::failed(None)).into_response();
                }
            };
            if !state.dedup.check_and_mark(&message.event_id) {
                info!(event_id = %message.event_id, "Duplicate event skipped");
                return Json(CodeResponse::failed(None)).into_response();
            }
            debug!(event_id = %message.event_id, tracked = state.dedup.len(), "New event");
            match state.handler_chain.handle(&message).await {
                Ok(_) => Json(CodeResponse::ok()).into_response(),
                Err(e) => {
                    error!(error = %e, event_id = %message.event_id, "Handler chain failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"code": 1, "error": "Internal Server Error"})),
                    )
                        .into_response()
                }
            }
        }
        Callback::Other { event_type } => {
            info!(event_type = ?event_type, "Unhandled callback acknowledged");
            Json(CodeResponse::ok()).into_response()
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .with_state(state)
}
