//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use disturbance_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

use crate::validate::Violation;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// One or more request fields failed validation.
  #[error("validation failed")]
  Validation(Vec<Violation>),

  /// The downstream messaging service failed or refused the batch.
  #[error("messaging service unavailable: {0}")]
  BadGateway(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    match e {
      CoreError::DisturbanceNotFound { .. }
      | CoreError::GlobalSubscriptionNotFound(_) => ApiError::NotFound(e.to_string()),
      CoreError::DisturbanceAlreadyExists { .. }
      | CoreError::DisturbanceClosed { .. }
      | CoreError::SubscriptionAlreadyExists { .. }
      | CoreError::GlobalSubscriptionAlreadyExists(_) => {
        ApiError::Conflict(e.to_string())
      }
      CoreError::Transport(source) => ApiError::BadGateway(source.to_string()),
      CoreError::Store(source) => ApiError::Internal(source),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Validation(violations) => (
        StatusCode::BAD_REQUEST,
        json!({ "error": "validation failed", "violations": violations }),
      ),
      ApiError::BadGateway(m) => (StatusCode::BAD_GATEWAY, json!({ "error": m })),
      ApiError::Internal(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
      }
    };
    (status, Json(body)).into_response()
  }
}
