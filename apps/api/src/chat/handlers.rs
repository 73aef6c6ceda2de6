//! Axum route handlers for the Chat API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::chat::service::answer_message;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// POST /api/chat
///
/// Always 200 once the body is valid; upstream failures come back as an
/// `[ERRO] ...` answer.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let answer = answer_message(
        message,
        state.context.as_ref(),
        &state.llm,
        &state.normalizer,
    )
    .await;

    Ok(Json(ChatResponse { answer }))
}
