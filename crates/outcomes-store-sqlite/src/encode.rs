//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order in SQL equals time order.

use chrono::{DateTime, SecondsFormat, Utc};
use outcomes_core::{
  outcome::{OutcomeRecord, OutcomeRow},
  patient::Patient,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `patients` row joined with `patient_outcomes`.
pub struct RawOutcomeRow {
  pub patient_id:  String,
  pub created_at:  String,
  pub outcome:     String,
  pub recorded_at: String,
  pub is_current:  bool,
}

impl RawOutcomeRow {
  pub const COLUMNS: &'static str =
    "p.patient_id, p.created_at, po.outcome, po.recorded_at, po.is_current";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      patient_id:  row.get(0)?,
      created_at:  row.get(1)?,
      outcome:     row.get(2)?,
      recorded_at: row.get(3)?,
      is_current:  row.get(4)?,
    })
  }

  pub fn into_row(self) -> Result<OutcomeRow> {
    Ok(OutcomeRow {
      patient_id:  self.patient_id,
      created_at:  decode_dt(&self.created_at)?,
      outcome:     self.outcome,
      recorded_at: decode_dt(&self.recorded_at)?,
      is_current:  self.is_current,
    })
  }
}

/// Raw values read from a `patient_outcomes` row.
pub struct RawOutcomeRecord {
  pub id:          i64,
  pub patient_id:  String,
  pub outcome:     String,
  pub recorded_at: String,
  pub is_current:  bool,
}

impl RawOutcomeRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      patient_id:  row.get(1)?,
      outcome:     row.get(2)?,
      recorded_at: row.get(3)?,
      is_current:  row.get(4)?,
    })
  }

  pub fn into_record(self) -> Result<OutcomeRecord> {
    Ok(OutcomeRecord {
      id:          self.id,
      patient_id:  self.patient_id,
      outcome:     self.outcome,
      recorded_at: decode_dt(&self.recorded_at)?,
      is_current:  self.is_current,
    })
  }
}

/// Raw values read from a `patients` row.
pub struct RawPatient {
  pub patient_id: String,
  pub created_at: String,
}

impl RawPatient {
  pub fn into_patient(self) -> Result<Patient> {
    Ok(Patient {
      patient_id: self.patient_id,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let whole = Utc.with_ymd_and_hms(2024, 1, 9, 7, 5, 3).unwrap();
    assert_eq!(encode_dt(whole), "2024-01-09T07:05:03.000000Z");

    let later = whole + chrono::Duration::microseconds(1);
    assert!(encode_dt(whole) < encode_dt(later));
    assert_eq!(decode_dt(&encode_dt(later)).unwrap(), later);
  }

  #[test]
  fn bad_timestamp_is_a_date_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
