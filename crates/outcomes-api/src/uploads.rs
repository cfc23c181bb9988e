//! The upload pipeline and the `/uploads` endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/uploads?filename=<name>` | Body: raw CSV bytes; 201 + [`UploadResponse`] |
//!
//! Pipeline: filename filter → decode + validate once → stamp every row with
//! one `recorded_at` → [`OutcomeStore::save`] in a single transaction.

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use outcomes_core::{outcome::BatchSummary, store::OutcomeStore};
use outcomes_csv::EncodingChain;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{ApiState, error::ApiError};

pub const SUCCESS_MESSAGE: &str = "File successfully uploaded and processed";

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Only names ending in `.csv` (case-sensitive) are accepted.
pub fn check_filename(filename: &str) -> Result<(), ApiError> {
  if filename.is_empty() {
    return Err(ApiError::BadRequest("No selected file".into()));
  }
  if !filename.ends_with(".csv") {
    return Err(ApiError::BadRequest("Only CSV files are allowed".into()));
  }
  Ok(())
}

/// Run one upload end to end. Nothing is written unless the whole file is
/// valid, and then either every row is committed or none is.
pub async fn ingest_upload<S>(
  store:       &S,
  encodings:   &EncodingChain,
  filename:    &str,
  bytes:       &[u8],
  recorded_at: DateTime<Utc>,
) -> Result<BatchSummary, ApiError>
where
  S: OutcomeStore,
{
  check_filename(filename).inspect_err(|e| warn!(filename, error = %e, "upload refused"))?;

  let table = outcomes_csv::parse(bytes, encodings).inspect_err(|e| {
    warn!(filename, error = %e, row = ?e.row(), "upload failed validation");
  })?;
  let encoding = table.encoding;

  let summary = store
    .save(table.into_records(recorded_at))
    .await
    .map_err(|e| {
      error!(filename, error = %e, "batch rolled back");
      ApiError::Store(Box::new(e))
    })?;

  info!(
    filename,
    %encoding,
    records = summary.records,
    new_patients = summary.new_patients,
    "upload ingested"
  );
  Ok(summary)
}

// ─── Handler ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UploadParams {
  /// The original filename; only used for the `.csv` check.
  #[serde(default)]
  pub filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
  pub status:  String,
  pub message: String,
  pub summary: BatchSummary,
}

/// `POST /uploads?filename=<name>`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<UploadParams>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: OutcomeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let summary = ingest_upload(
    state.store.as_ref(),
    &state.encodings,
    &params.filename,
    &body,
    Utc::now(),
  )
  .await?;

  Ok((
    StatusCode::CREATED,
    Json(UploadResponse {
      status: "success".into(),
      message: SUCCESS_MESSAGE.into(),
      summary,
    }),
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn filename_filter_is_case_sensitive() {
    assert!(check_filename("outcomes.csv").is_ok());
    assert!(check_filename("archive.tar.csv").is_ok());

    let err = check_filename("OUTCOMES.CSV").unwrap_err();
    assert_eq!(err.to_string(), "Only CSV files are allowed");
    assert!(check_filename("outcomes.xlsx").is_err());
  }

  #[test]
  fn empty_filename_means_no_file() {
    assert_eq!(check_filename("").unwrap_err().to_string(), "No selected file");
  }
}
