//! Static file fallback shared by every tool router.
//!
//! `/` maps to the tool's `index.html`; any path component that is not a
//! plain name is rejected with 403 before touching the filesystem, and the
//! resolved path is prefix-checked against the tool root. Unknown extensions
//! serve as `application/octet-stream`.

use std::path::{Component, Path, PathBuf};

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::config::ToolKind;
use crate::domain::evidence::sanitize_json;
use crate::server::error::ApiError;
use crate::server::AppState;

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("jsonl") => "application/x-ndjson",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Resolve a request path to a file under `root`, or reject it.
fn resolve(root: &Path, uri_path: &str) -> Result<PathBuf, ApiError> {
    let trimmed = uri_path.trim_start_matches('/');
    let relative = if trimmed.is_empty() {
        "index.html"
    } else {
        trimmed
    };
    let relative = Path::new(relative);
    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            _ => return Err(ApiError::Forbidden),
        }
    }
    let candidate = root.join(relative);
    // The component walk blocks `..`, but a symlinked entry could still
    // resolve outside the root.
    if let Ok(resolved) = candidate.canonicalize() {
        if let Ok(canonical_root) = root.canonicalize() {
            if !resolved.starts_with(&canonical_root) {
                return Err(ApiError::Forbidden);
            }
        }
    }
    Ok(candidate)
}

/// GET fallback handler serving the tool's files.
pub async fn serve_static(State(state): State<AppState>, uri: Uri) -> Response {
    let root = state.tool_root();
    let path = match resolve(&root, uri.path()) {
        Ok(path) => path,
        Err(e) => return e.into_response(),
    };

    let data = match std::fs::read(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return ApiError::NotFound.into_response();
        }
        Err(e) => {
            debug!("static read failed: {}: {}", path.display(), e);
            return ApiError::Internal("Server error".to_string()).into_response();
        }
    };

    let mime = content_type(&path);
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");

    // The ACH tool's JSON artifacts are hand-editable; serve a sanitized
    // copy when the stored bytes no longer parse, and keep them uncached.
    if state.tool() == ToolKind::Ach && is_json {
        let text = String::from_utf8_lossy(&data).into_owned();
        let body = if serde_json::from_str::<serde_json::Value>(&text).is_err() {
            sanitize_json(&text)
        } else {
            text
        };
        return (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime),
                (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
                (header::PRAGMA, "no-cache"),
            ],
            body,
        )
            .into_response();
    }

    (StatusCode::OK, [(header::CONTENT_TYPE, mime)], data).into_response()
}
