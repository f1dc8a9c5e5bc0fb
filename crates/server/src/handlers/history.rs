//! Conversation history endpoint

use axum::{extract::State, Json};

use crate::{error::ApiResult, models::HistoryResponse, state::AppState};

/// Recent questions asked of the tutor
pub async fn history(State(state): State<AppState>) -> ApiResult<Json<HistoryResponse>> {
    Ok(Json(HistoryResponse {
        summary: state.bot.history_summary()?,
        questions: state.bot.history()?,
    }))
}
