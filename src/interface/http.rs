//! HTTP route handlers for the agent.
//!
//! `POST /chat` runs one prompt end to end; `GET /healthz` is the liveness probe.
//! Every failure, whatever the stage, becomes `{"ok":false,"error":...}` with status 400,
//! and partial outputs are dropped. That includes bodies over the 15 MiB limit.

use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::planner::Orchestrator;
use crate::domain::error::AgentError;
use crate::domain::types::ActionRecord;

const BODY_LIMIT: usize = 15 * 1024 * 1024;

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<ActionRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    fn success(outputs: Vec<ActionRecord>) -> Self {
        Self {
            ok: true,
            outputs: Some(outputs),
            error: None,
        }
    }

    fn failure(error: String) -> Self {
        Self {
            ok: false,
            outputs: None,
            error: Some(error),
        }
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// POST /chat - plan and execute a prompt.
async fn chat(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    match body {
        Ok(body) => handle(&state.orchestrator, &body).await,
        Err(rejection) => {
            let err = AgentError::Input(rejection.body_text());
            tracing::warn!(status = %rejection.status(), error = %err, "chat body rejected");
            (StatusCode::BAD_REQUEST, Json(ChatResponse::failure(err.to_string())))
        }
    }
}

pub async fn handle(orchestrator: &Orchestrator, body: &[u8]) -> (StatusCode, Json<ChatResponse>) {
    let result = match parse_prompt(body) {
        Ok(prompt) => orchestrator.run(&prompt).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outputs) => {
            tracing::info!(actions = outputs.len(), "chat request completed");
            (StatusCode::OK, Json(ChatResponse::success(outputs)))
        }
        Err(e) => {
            tracing::error!(error = %e, "chat request failed");
            (StatusCode::BAD_REQUEST, Json(ChatResponse::failure(e.to_string())))
        }
    }
}

/// Extract the prompt: the body must be a JSON object with a non-empty string `prompt`.
pub fn parse_prompt(body: &[u8]) -> Result<String, AgentError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AgentError::Input(format!("body is not valid JSON: {}", e)))?;

    match value.get("prompt") {
        Some(Value::String(prompt)) if !prompt.is_empty() => Ok(prompt.clone()),
        Some(Value::String(_)) => Err(AgentError::Input("prompt must not be empty".to_string())),
        Some(_) => Err(AgentError::Input("prompt must be a string".to_string())),
        None => Err(AgentError::Input("missing prompt".to_string())),
    }
}
