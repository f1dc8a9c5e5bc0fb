//! Chat page endpoint

use axum::{extract::State, response::Html};

use crate::state::AppState;

/// Serve the pre-rendered chat page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.to_string())
}
