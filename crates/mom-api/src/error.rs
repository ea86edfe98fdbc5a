//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The completion service failed while generating minutes.
  #[error("generation failed: {0}")]
  Generation(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl From<mom_core::Error> for ApiError {
  fn from(e: mom_core::Error) -> Self {
    match e {
      mom_core::Error::SessionNotFound(id) => {
        Self::NotFound(format!("session {id} not found"))
      }
      mom_core::Error::Completion(inner) => Self::Generation(inner),
      mom_core::Error::Store(inner) | mom_core::Error::State(inner) => {
        Self::Store(inner)
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
      ApiError::Generation(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
