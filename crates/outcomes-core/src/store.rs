//! The `OutcomeStore` trait.
//!
//! Implemented by storage backends (e.g. `outcomes-store-sqlite`). The API and
//! the server binary depend on this abstraction, not on a concrete backend.

use std::future::Future;

use crate::{
  outcome::{BatchSummary, NewOutcome, OutcomeRecord, OutcomeRow},
  patient::Patient,
};

/// Abstraction over an outcome store backend.
///
/// The backend is the only writer of the patient registry and the outcome
/// history. All methods return `Send` futures so the trait can be used from
/// axum handlers on a multi-threaded runtime.
pub trait OutcomeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Ingest one batch in file order, inside a single transaction.
  ///
  /// For each record: register the patient if unseen (with
  /// `created_at = recorded_at`), clear `is_current` on the patient's earlier
  /// records, then append the new record as current. Either every record is
  /// committed or none is.
  fn save(
    &self,
    records: Vec<NewOutcome>,
  ) -> impl Future<Output = Result<BatchSummary, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The full joined history, ordered by `patient_id`, then `recorded_at`,
  /// then insertion order.
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<OutcomeRow>, Self::Error>> + Send + '_;

  /// Only the current outcome of each patient, ordered by `patient_id`.
  fn current_outcomes(
    &self,
  ) -> impl Future<Output = Result<Vec<OutcomeRow>, Self::Error>> + Send + '_;

  /// Look up a registry entry. Returns `None` if the id was never ingested.
  fn get_patient(
    &self,
    patient_id: &str,
  ) -> impl Future<Output = Result<Option<Patient>, Self::Error>> + Send;

  /// Every record for one patient, oldest first.
  fn patient_history(
    &self,
    patient_id: &str,
  ) -> impl Future<Output = Result<Vec<OutcomeRecord>, Self::Error>> + Send;
}
