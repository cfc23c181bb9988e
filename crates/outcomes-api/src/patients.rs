//! Handler for `GET /patients/{id}`: registry entry plus full history.

use axum::{
  Json,
  extract::{Path, State},
};
use outcomes_core::{outcome::OutcomeRecord, patient::Patient, store::OutcomeStore};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Serialize, Deserialize)]
pub struct PatientView {
  #[serde(flatten)]
  pub patient: Patient,
  /// Oldest first; the last entry is the current one.
  pub history: Vec<OutcomeRecord>,
}

/// `GET /patients/{id}`: 404 if the id was never ingested.
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<PatientView>, ApiError>
where
  S: OutcomeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let patient = state
    .store
    .get_patient(&id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("patient {id} not found")))?;

  let history = state
    .store
    .patient_history(&id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(PatientView { patient, history }))
}
