//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No valid session. Distinct from a policy denial.
  #[error("unauthorized")]
  Unauthorized,

  /// A policy decision came back `false`.
  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(e))
  }
}

/// Core errors reaching a handler are all input validation failures.
impl From<warden_core::Error> for Error {
  fn from(e: warden_core::Error) -> Self { Error::BadRequest(e.to_string()) }
}

impl From<JsonRejection> for Error {
  fn from(rejection: JsonRejection) -> Self {
    Error::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_owned()),
      Error::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      Error::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      Error::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      Error::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      Error::Internal(_) | Error::Store(_) => {
        tracing::error!(error = %self, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal server error".to_owned(),
        )
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if matches!(self, Error::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"warden\""),
      );
    }
    res
  }
}
