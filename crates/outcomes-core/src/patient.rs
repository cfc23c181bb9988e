//! Patient: the registry entry created the first time an id is ingested.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registry row. Created once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
  pub patient_id: String,
  /// The `recorded_at` of the batch in which this patient first appeared.
  pub created_at: DateTime<Utc>,
}
