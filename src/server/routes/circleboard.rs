//! Circle-boarding tool endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;

use crate::server::error::{ok_body, ApiResult};
use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/save-circleboard", post(save_circleboard))
        .route("/save-hypothesis", post(save_hypothesis))
}

/// Persist the raw board body verbatim.
async fn save_circleboard(State(state): State<AppState>, body: String) -> ApiResult<Json<Value>> {
    state.circleboard_store().save_board(&body)?;
    Ok(ok_body())
}

/// Cross-write the hypothesis tool's source file, creating its directory.
async fn save_hypothesis(State(state): State<AppState>, body: String) -> ApiResult<Json<Value>> {
    state.hypothesis_store().write_source_raw(&body)?;
    Ok(ok_body())
}
