//! HTTP route handlers for the chat relay.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::common::errors::ChatError;
use crate::common::ids::ThreadId;
use crate::conversation::exchange::ExchangeOutcome;
use crate::conversation::message::Message;
use crate::session::ChatSession;

use super::state::AppState;

type ApiError = (StatusCode, String);

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(send_message))
        .route("/api/chat/messages", get(list_messages))
        .route("/api/chat/reset", post(reset_conversation))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "chatkit-client",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Lock the session without waiting; a held lock means an exchange is in flight.
fn lock_idle(session: &Mutex<ChatSession>) -> Result<MutexGuard<'_, ChatSession>, ApiError> {
    session
        .try_lock()
        .map_err(|_| (StatusCode::CONFLICT, "a reply is still pending".to_string()))
}

/// Chat message request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
}

/// Chat message response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Text shown for the assistant turn.
    pub reply: String,
    /// Active thread after the exchange.
    pub thread_id: Option<ThreadId>,
    /// How the exchange ended.
    pub outcome: ExchangeOutcome,
}

/// Relay one user message to the backend.
async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let mut session = lock_idle(&state.session)?;

    let outcome = session.send(&request.message).await.map_err(|e| match e {
        ChatError::EmptyInput => (StatusCode::BAD_REQUEST, e.to_string()),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    })?;

    Ok(Json(ChatResponse {
        reply: outcome.display_text().to_string(),
        thread_id: session.store().active_thread_id().cloned(),
        outcome,
    }))
}

/// Conversation snapshot.
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    /// Messages in append order.
    pub messages: Vec<Message>,
    /// Active thread, if any.
    pub thread_id: Option<ThreadId>,
}

/// List the conversation log.
async fn list_messages(State(state): State<Arc<AppState>>) -> Result<Json<MessagesResponse>, ApiError> {
    let session = lock_idle(&state.session)?;
    let store = session.store();

    Ok(Json(MessagesResponse {
        messages: store.messages().to_vec(),
        thread_id: store.active_thread_id().cloned(),
    }))
}

/// Clear the conversation and its thread.
async fn reset_conversation(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    lock_idle(&state.session)?.clear();
    Ok(StatusCode::NO_CONTENT)
}
