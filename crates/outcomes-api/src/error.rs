//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler or the upload pipeline.
///
/// The `Display` text is the message shown to the uploader.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The request itself is unusable (no filename, not a `.csv`).
  #[error("{0}")]
  BadRequest(String),

  /// The file failed decoding or structural validation, or the reader broke
  /// while checking it.
  #[error("Invalid CSV file: {0}")]
  InvalidCsv(#[from] outcomes_csv::Error),

  #[error("{0}")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::InvalidCsv(e) if e.is_file_fault() => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::InvalidCsv(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    (status, Json(json!({ "status": "error", "message": self.to_string() })))
      .into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn malformed_file_is_unprocessable() {
    let err = ApiError::from(outcomes_csv::Error::EmptyField { row: 2, field: "Outcome" });
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err = ApiError::from(outcomes_csv::Error::Undecodable);
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[test]
  fn reader_failure_is_a_server_error() {
    let err = ApiError::from(outcomes_csv::Error::from(std::io::Error::other("broken pipe")));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.to_string(), "Invalid CSV file: Error validating CSV: broken pipe");
  }
}
