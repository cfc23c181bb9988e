//! Handlers for `/outcomes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/outcomes` | Full history, by patient then `recorded_at` |
//! | `GET`  | `/outcomes/current` | One current row per patient |

use axum::{Json, extract::State};
use outcomes_core::{outcome::OutcomeRow, store::OutcomeStore};

use crate::{ApiState, error::ApiError};

/// `GET /outcomes`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<OutcomeRow>>, ApiError>
where
  S: OutcomeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let rows = state
    .store
    .list_all()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(rows))
}

/// `GET /outcomes/current`
pub async fn current<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<OutcomeRow>>, ApiError>
where
  S: OutcomeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let rows = state
    .store
    .current_outcomes()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(rows))
}
