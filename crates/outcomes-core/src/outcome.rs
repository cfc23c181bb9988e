//! Outcome records: the append-only history and its read models.
//!
//! Every ingested CSV row becomes exactly one [`OutcomeRecord`]. Older records
//! for the same patient are never deleted; only their `is_current` flag is
//! cleared, so at most one record per patient is current at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Write side ──────────────────────────────────────────────────────────────

/// One row to ingest. All rows of a batch share the same `recorded_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOutcome {
  pub patient_id:  String,
  pub outcome:     String,
  pub recorded_at: DateTime<Utc>,
}

impl NewOutcome {
  pub fn new(
    patient_id: impl Into<String>,
    outcome: impl Into<String>,
    recorded_at: DateTime<Utc>,
  ) -> Self {
    Self {
      patient_id: patient_id.into(),
      outcome: outcome.into(),
      recorded_at,
    }
  }
}

/// What a completed batch did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
  /// Timestamp of the batch; `None` when the batch was empty.
  pub recorded_at:  Option<DateTime<Utc>>,
  /// Outcome records appended.
  pub records:      usize,
  /// Patients seen for the first time in this batch.
  pub new_patients: usize,
}

// ─── Read side ───────────────────────────────────────────────────────────────

/// A persisted row of the outcome history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
  pub id:          i64,
  pub patient_id:  String,
  pub outcome:     String,
  pub recorded_at: DateTime<Utc>,
  pub is_current:  bool,
}

/// An outcome record joined with its patient, as listed to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRow {
  pub patient_id:  String,
  pub created_at:  DateTime<Utc>,
  pub outcome:     String,
  pub recorded_at: DateTime<Utc>,
  pub is_current:  bool,
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  fn at() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() }

  #[test]
  fn new_outcome_takes_owned_or_borrowed_strings() {
    let o = NewOutcome::new(String::from("P1"), "improved", at());
    assert_eq!(o.patient_id, "P1");
    assert_eq!(o.outcome, "improved");
  }

  #[test]
  fn outcome_row_serialises_with_flat_fields() {
    let row = OutcomeRow {
      patient_id:  "P1".into(),
      created_at:  at(),
      outcome:     "stable".into(),
      recorded_at: at(),
      is_current:  true,
    };
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["patient_id"], "P1");
    assert_eq!(json["is_current"], true);
    assert_eq!(json["recorded_at"], "2024-03-01T12:00:00Z");
  }
}
