//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use campus_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error: domain errors become 4xx, the rest 500.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.core() {
      Some(campus_core::Error::NotOwner { .. }) => ApiError::Forbidden(e.to_string()),
      Some(campus_core::Error::SubmissionConflict { .. }) => ApiError::Conflict(e.to_string()),
      Some(core) if core.is_client_error() => ApiError::BadRequest(e.to_string()),
      _ => {
        tracing::error!(error = %e, "store operation failed");
        ApiError::Store(Box::new(e))
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
