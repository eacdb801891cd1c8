//! Hypothesis-generation tool endpoints.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::server::error::{ok_body, ApiError, ApiResult};
use crate::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/add-source", post(add_source))
        .route("/source", post(rewrite_source))
        .route("/save-hypothesis", post(save_hypothesis))
        .route("/hypotheses", post(rewrite_hypotheses))
        .route("/update-hypothesis-line", post(update_hypothesis_line))
        .route("/delete-hypotheses-file", post(delete_hypotheses_file))
        .route("/hypothesis-ach", get(get_bridge))
        .route("/save-hypothesis-ach", post(save_bridge))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

fn parse_json(body: &str) -> ApiResult<Value> {
    serde_json::from_str(body).map_err(|_| ApiError::BadRequest("Invalid JSON".to_string()))
}

/// Append one bullet to the source list. Plain-text bodies are the label
/// itself; JSON bodies carry `label` or `text`.
async fn add_source(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<Json<Value>> {
    let mut label = body.trim().to_string();
    if is_json(&headers) {
        if let Ok(json) = serde_json::from_str::<Value>(&body) {
            label = json
                .get("label")
                .and_then(|v| v.as_str())
                .or_else(|| json.get("text").and_then(|v| v.as_str()))
                .unwrap_or("")
                .trim()
                .to_string();
        }
    }
    if label.is_empty() {
        return Err(ApiError::BadRequest("Empty label".to_string()));
    }
    state.hypothesis_store().add_source(&label)?;
    Ok(ok_body())
}

/// Rewrite the whole source list from `{items: [...]}`.
async fn rewrite_source(State(state): State<AppState>, body: String) -> ApiResult<Json<Value>> {
    let json = parse_json(&body)?;
    let items: Vec<String> = match json.get("items") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    state.hypothesis_store().write_sources(&items)?;
    Ok(ok_body())
}

/// Append one generated permutation. JSON bodies carry `permutation` or
/// `text`; anything else appends the raw body.
async fn save_hypothesis(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<Json<Value>> {
    let mut line = body.clone();
    if is_json(&headers) {
        if let Ok(json) = serde_json::from_str::<Value>(&body) {
            line = json
                .get("permutation")
                .and_then(|v| v.as_str())
                .or_else(|| json.get("text").and_then(|v| v.as_str()))
                .map(str::to_string)
                .unwrap_or(body);
        }
    }
    state.hypothesis_store().append_hypothesis(&line)?;
    Ok(ok_body())
}

/// Rewrite `Hypotheses.txt` from `{lines: [...]}`.
async fn rewrite_hypotheses(State(state): State<AppState>, body: String) -> ApiResult<Json<Value>> {
    let json = parse_json(&body)?;
    let lines: Vec<String> = match json.get("lines") {
        Some(Value::Array(lines)) => lines
            .iter()
            .map(|l| match l {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };
    state.hypothesis_store().rewrite_hypotheses(&lines)?;
    Ok(ok_body())
}

/// Replace one line of `Hypotheses.txt` from `{index, text}`.
async fn update_hypothesis_line(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<Value>> {
    let json = parse_json(&body)?;
    let index = json
        .get("index")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| ApiError::BadRequest("Invalid index".to_string()))?;
    let text = json.get("text").and_then(|v| v.as_str()).unwrap_or("");
    state
        .hypothesis_store()
        .update_hypothesis_line(index as usize, text)?;
    Ok(ok_body())
}

async fn delete_hypotheses_file(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.hypothesis_store().delete_hypotheses()?;
    Ok(ok_body())
}

/// Current ACH bridge payload; absent or corrupt files read as `{}`.
async fn get_bridge(State(state): State<AppState>) -> Json<Value> {
    Json(state.ach_store().load_bridge())
}

async fn save_bridge(State(state): State<AppState>, body: String) -> ApiResult<Json<Value>> {
    let json = parse_json(&body)?;
    state.ach_store().merge_bridge(&json)?;
    Ok(ok_body())
}
