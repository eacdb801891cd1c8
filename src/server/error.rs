//! HTTP error surface shared by the tool routers.
//!
//! Every failure renders as `{ok:false, error}`: client mistakes (bad JSON,
//! bad index, blank label) as 400, traversal as 403, everything else as 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    Internal(String),
}

/// Wire body for failures.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            ok: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::Domain(DomainError::LineIndexOutOfRange { .. }) => {
                ApiError::BadRequest("Index out of range".to_string())
            }
            ApplicationError::Domain(domain) => ApiError::BadRequest(domain.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// The `{ok:true}` success body.
pub fn ok_body() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

pub type ApiResult<T> = Result<T, ApiError>;
