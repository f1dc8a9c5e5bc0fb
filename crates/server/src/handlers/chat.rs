//! Chat endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    error::{ApiError, ApiResult},
    models::{ChatRequest, ChatResponse},
    state::AppState,
};

/// Answer one chat message
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidJson(e.body_text()))?;

    let message = match request.message {
        Some(message) if !message.is_empty() => message,
        _ => return Err(ApiError::MissingMessage),
    };

    let reply = state.bot.chat(&message).await?;
    tracing::debug!(
        "Answered with confidence {:.2} from {:?}",
        reply.confidence,
        reply.source
    );

    Ok(Json(ChatResponse::from(reply)))
}
