use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use super::events::HubEvent;
use super::validation::validate_message;
use super::{ApiError, ApiResponse, AppState, ChatRequest};
use crate::services::ChatReply;

/// `POST /api/chat`
///
/// Always answers with 200 once the message is valid; upstream failures
/// degrade to the locally formatted answer.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChatReply>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let message = validate_message(request.message.as_deref())?;

    let reply = state.shared.chat.respond(message).await;

    state.hub().publish(HubEvent::ChatAnswered {
        intent: reply.intent,
        sources: reply.sources.len(),
    });

    Ok(Json(ApiResponse::success(reply)))
}
