//! HTTP gateway for the dialogue orchestration service.
//!
//! Thin axum layer over the [`Orchestrator`]: all pipeline behavior lives
//! there; this binary only wires configuration, routing, and error mapping.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use chat_core::IncomingMessage;
use database::{Database, HistoryStats};
use lookup_tools::default_toolset;
use mistral_brain::{GateStage, MistralConfig, MistralGenerator, SafetyClassifier};
use orchestrator::{Orchestrator, OrchestratorError};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<Orchestrator>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    user_id: String,
    user_name: String,
    #[serde(default)]
    is_group: bool,
    #[serde(default)]
    is_mentioned: bool,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct Health {
    status: String,
}

#[derive(Debug, Serialize)]
struct ClearResponse {
    deleted: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let addr = env::var("CHATBOT_API_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let database_url = env::var("CHATBOT_DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:chat_history.db?mode=rwc".to_string());
    let gate_output = env::var("CHATBOT_GATE_OUTPUT")
        .ok()
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(true);

    let db = Database::connect(&database_url).await?;
    db.migrate().await?;

    let config = MistralConfig::from_env()?;
    let tools = Arc::new(default_toolset()?);
    let generator = Arc::new(MistralGenerator::new(config.clone(), tools)?);
    let input_gate = Arc::new(SafetyClassifier::new(config.clone(), GateStage::Input)?);
    let output_gate = Arc::new(SafetyClassifier::new(config, GateStage::Output)?);

    let orchestrator = Arc::new(
        Orchestrator::new(db, input_gate, output_gate, generator).with_output_gate(gate_output),
    );

    let state = AppState { orchestrator };

    let app = Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/history/:user_id", delete(clear_history))
        .with_state(state);

    let addr: SocketAddr = addr.parse()?;
    info!(%addr, "Chat API listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = IncomingMessage {
        message: payload.message,
        user_id: payload.user_id,
        user_name: payload.user_name,
        is_group: payload.is_group,
        is_mentioned: payload.is_mentioned,
    };

    let reply = state.orchestrator.process(message).await?;

    Ok(Json(ChatResponse {
        response: reply.response,
        timestamp: reply.timestamp,
    }))
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

async fn stats(State(state): State<AppState>) -> Result<Json<HistoryStats>, ApiError> {
    let stats = state.orchestrator.stats().await?;
    Ok(Json(stats))
}

async fn clear_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ClearResponse>, ApiError> {
    let deleted = state.orchestrator.clear_history(&user_id).await?;
    Ok(Json(ClearResponse { deleted }))
}

/// Internal failures map to a generic 500; details stay in the logs.
#[derive(Debug)]
struct ApiError(OrchestratorError);

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        let body = serde_json::json!({
            "detail": "Error processing message"
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
