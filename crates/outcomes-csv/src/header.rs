//! The required header and the column-name-to-index mapping built from it.

use csv::StringRecord;

use crate::{Error, Result};

pub const PATIENT_ID: &str = "Patient ID";
pub const OUTCOME: &str = "Outcome";

/// The exact column set every upload must carry, in any order.
pub const REQUIRED_COLUMNS: [&str; 2] = [PATIENT_ID, OUTCOME];

/// Where the two required columns live in this file.
///
/// Built once from the header record and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMap {
  patient_id: usize,
  outcome:    usize,
}

impl HeaderMap {
  /// Check the header's width and column names. Names must match exactly;
  /// surrounding whitespace is not forgiven.
  pub fn from_header(header: &StringRecord) -> Result<Self> {
    if header.len() != REQUIRED_COLUMNS.len() {
      return Err(Error::ColumnCount { found: header.len() });
    }

    let position = |name: &str| header.iter().position(|field| field == name);

    let (Some(patient_id), Some(outcome)) = (position(PATIENT_ID), position(OUTCOME))
    else {
      let missing = REQUIRED_COLUMNS
        .into_iter()
        .filter(|name| position(*name).is_none())
        .collect();
      return Err(Error::MissingColumns(missing));
    };

    Ok(Self { patient_id, outcome })
  }

  pub fn width(&self) -> usize { REQUIRED_COLUMNS.len() }

  /// Pull the trimmed `(patient_id, outcome)` pair out of data row `row`
  /// (1-based, header = row 1).
  pub fn extract<'r>(
    &self,
    record: &'r StringRecord,
    row: usize,
  ) -> Result<(&'r str, &'r str)> {
    if record.len() != self.width() {
      return Err(Error::RowWidth {
        row,
        expected: self.width(),
        found: record.len(),
      });
    }

    let field = move |index: usize, name: &'static str| {
      let value = record.get(index).map(str::trim).unwrap_or_default();
      if value.is_empty() {
        Err(Error::EmptyField { row, field: name })
      } else {
        Ok(value)
      }
    };

    let patient_id = field(self.patient_id, PATIENT_ID)?;
    let outcome = field(self.outcome, OUTCOME)?;
    Ok((patient_id, outcome))
  }
}
