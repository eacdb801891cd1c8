//! Competing-hypotheses tool endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;

use crate::server::error::{ok_body, ApiError, ApiResult};
use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/save-evidence", post(save_evidence))
        .route("/remove-from-evidence-jsonl", post(remove_from_evidence))
        .route("/save-hypothesis", post(save_hypothesis))
        .route("/save-input-hypothesis", post(save_input_hypothesis))
}

fn parse_json(body: &str) -> ApiResult<Value> {
    serde_json::from_str(body).map_err(|_| ApiError::BadRequest("Invalid JSON".to_string()))
}

fn require_object(value: &Value) -> ApiResult<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Expected JSON object".to_string()))
    }
}

/// Persist the evidence tree and rewrite its derived JSONL.
async fn save_evidence(State(state): State<AppState>, body: String) -> ApiResult<Json<Value>> {
    let tree = parse_json(&body)?;
    state.ach_store().save_evidence(&tree)?;
    Ok(ok_body())
}

/// Drop one record by id from the evidence JSONL.
async fn remove_from_evidence(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<Value>> {
    let json = parse_json(&body)?;
    let id = json
        .get("id")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing id".to_string()))?;
    state.ach_store().remove_evidence(id)?;
    Ok(ok_body())
}

async fn save_hypothesis(State(state): State<AppState>, body: String) -> ApiResult<Json<Value>> {
    let json = parse_json(&body)?;
    require_object(&json)?;
    state.ach_store().save_hypothesis(&json)?;
    Ok(ok_body())
}

async fn save_input_hypothesis(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<Value>> {
    let json = parse_json(&body)?;
    require_object(&json)?;
    state.ach_store().save_input_hypothesis(&json)?;
    Ok(ok_body())
}
