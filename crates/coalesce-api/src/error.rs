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
  /// Neither `email` nor `phoneNumber` was supplied.
  #[error("Email or phoneNumber is required")]
  MissingIdentifier,

  /// Anything that went wrong past validation: store failures and
  /// consistency violations alike. Logged with detail, surfaced opaque.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::MissingIdentifier => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Email or phoneNumber is required" })),
      )
        .into_response(),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "identity resolution failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "Internal Server Error" })),
        )
          .into_response()
      }
    }
  }
}
