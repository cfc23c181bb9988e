//! Structural validation of an uploaded outcomes file.
//!
//! Pipeline:
//!   raw bytes
//!     └─ EncodingChain::decode()   → text under the first clean encoding
//!          └─ csv records           → header + data rows
//!               └─ HeaderMap        → column positions, per-row checks
//!                    └─ OutcomeTable → trimmed rows ready to ingest
//!
//! Checks run in a fixed order and stop at the first failure.

use std::path::Path;

use chrono::{DateTime, Utc};
use csv::StringRecord;
use outcomes_core::outcome::NewOutcome;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  encoding::{Decoded, Encoding, EncodingChain},
  header::HeaderMap,
};

// ─── Parsed table ────────────────────────────────────────────────────────────

/// One data row that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRow {
  /// 1-based position in the file, header = row 1.
  pub row:        usize,
  pub patient_id: String,
  pub outcome:    String,
}

/// A fully validated upload, decoded once.
#[derive(Debug, Clone)]
pub struct OutcomeTable {
  pub encoding: Encoding,
  pub rows:     Vec<ValidatedRow>,
}

impl OutcomeTable {
  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Turn the rows into a batch, in file order, all stamped with the same
  /// `recorded_at`. Duplicate patient ids are kept; the last one ends up
  /// current.
  pub fn into_records(self, recorded_at: DateTime<Utc>) -> Vec<NewOutcome> {
    self
      .rows
      .into_iter()
      .map(|r| NewOutcome::new(r.patient_id, r.outcome, recorded_at))
      .collect()
  }
}

/// Decode `bytes` and run every structural check.
pub fn parse(bytes: &[u8], chain: &EncodingChain) -> Result<OutcomeTable> {
  let Decoded { encoding, text } = chain.decode(bytes)?;
  debug!(%encoding, bytes = bytes.len(), "decoded upload");

  if text.is_empty() {
    return Err(Error::Empty);
  }

  let mut reader = csv::ReaderBuilder::new()
    .has_headers(false)
    .flexible(true)
    .from_reader(text.as_bytes());
  let mut record = StringRecord::new();

  // A leading empty line is an empty header.
  if blank_line_at(&text, 0) || !reader.read_record(&mut record)? {
    return Err(Error::MissingHeader);
  }
  debug!(header = ?record, "csv header");

  let columns = HeaderMap::from_header(&record)?;

  let mut rows = Vec::new();
  let mut row = 1;
  loop {
    // The reader drops empty lines; each one is still a row with no columns.
    if blank_line_at(&text, reader.position().byte() as usize) {
      return Err(Error::RowWidth {
        row:      row + 1,
        expected: columns.width(),
        found:    0,
      });
    }
    if !reader.read_record(&mut record)? {
      break;
    }
    row += 1;

    let (patient_id, outcome) = columns.extract(&record, row)?;
    rows.push(ValidatedRow {
      row,
      patient_id: patient_id.to_owned(),
      outcome: outcome.to_owned(),
    });
  }

  Ok(OutcomeTable { encoding, rows })
}

/// Whether an empty line starts at byte `at`. The `\n` of a `\r\n` that
/// ended the previous record may still be unread at `at`.
fn blank_line_at(text: &str, at: usize) -> bool {
  let bytes = text.as_bytes();
  let before = at.checked_sub(1).and_then(|i| bytes.get(i)).copied();
  let at = match (before, bytes.get(at).copied()) {
    (Some(b'\r'), Some(b'\n')) => at + 1,
    _ => at,
  };
  matches!(bytes.get(at).copied(), Some(b'\r' | b'\n'))
}

// ─── Verdict ─────────────────────────────────────────────────────────────────

pub const VALID_MESSAGE: &str = "CSV is valid";

/// Pass/fail plus the message to show the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
  pub is_valid: bool,
  pub message:  String,
}

impl Verdict {
  pub fn valid() -> Self {
    Self {
      is_valid: true,
      message:  VALID_MESSAGE.to_owned(),
    }
  }

  pub fn invalid(message: impl Into<String>) -> Self {
    Self {
      is_valid: false,
      message:  message.into(),
    }
  }
}

impl From<&Error> for Verdict {
  fn from(e: &Error) -> Self { Self::invalid(e.to_string()) }
}

/// Validate `bytes`, folding any failure into the verdict's message.
pub fn validate(bytes: &[u8], chain: &EncodingChain) -> Verdict {
  match parse(bytes, chain) {
    Ok(table) => {
      debug!(encoding = %table.encoding, rows = table.len(), "csv is valid");
      Verdict::valid()
    }
    Err(e) => {
      warn!(error = %e, row = ?e.row(), "csv rejected");
      Verdict::from(&e)
    }
  }
}

/// Validate a file on disk. Read errors become a failed verdict too.
pub fn validate_path(path: impl AsRef<Path>, chain: &EncodingChain) -> Verdict {
  match std::fs::read(path.as_ref()) {
    Ok(bytes) => validate(&bytes, chain),
    Err(e) => {
      let e = Error::from(e);
      warn!(error = %e, path = %path.as_ref().display(), "could not read csv");
      Verdict::from(&e)
    }
  }
}
