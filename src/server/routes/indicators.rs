//! Indicator endpoints shared by the timeline and causal-map tools.

use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;

use crate::server::error::{ok_body, ApiError, ApiResult};
use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/save-indicators", post(save_indicators))
}

/// Normalize the record and append one line to the shared keyword journal.
async fn save_indicators(State(state): State<AppState>, body: String) -> ApiResult<Json<Value>> {
    let json: Value = serde_json::from_str(&body)
        .map_err(|_| ApiError::BadRequest("Invalid JSON".to_string()))?;
    state.indicator_journal().append(&json)?;
    Ok(ok_body())
}
