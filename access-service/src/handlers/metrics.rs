use axum::{extract::State, response::IntoResponse};

use crate::AppState;

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
