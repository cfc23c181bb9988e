//! Error types for the outcomes CSV validator.
//!
//! The `Display` text of every variant is the message shown to the person who
//! uploaded the file.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Could not decode CSV file with any supported encoding")]
  Undecodable,

  #[error("File is empty")]
  Empty,

  #[error("Could not read CSV header")]
  MissingHeader,

  #[error("CSV must contain exactly two columns: 'Patient ID' and 'Outcome'")]
  ColumnCount { found: usize },

  #[error("Missing required columns: {}", .0.join(", "))]
  MissingColumns(Vec<&'static str>),

  #[error("Row {row} has incorrect number of columns")]
  RowWidth { row: usize, expected: usize, found: usize },

  #[error("Row {row}: '{field}' cannot be empty")]
  EmptyField { row: usize, field: &'static str },

  #[error("unknown encoding label: {0:?}")]
  UnknownEncoding(String),

  #[error("Error validating CSV: {0}")]
  Csv(#[from] csv::Error),

  #[error("Error validating CSV: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// `true` when the file itself is at fault: it could not be decoded or is
  /// malformed. Reader and I/O failures return `false`.
  pub fn is_file_fault(&self) -> bool {
    matches!(
      self,
      Self::Undecodable
        | Self::Empty
        | Self::MissingHeader
        | Self::ColumnCount { .. }
        | Self::MissingColumns(_)
        | Self::RowWidth { .. }
        | Self::EmptyField { .. }
    )
  }

  /// The 1-based row a structural failure points at, header = row 1.
  pub fn row(&self) -> Option<usize> {
    match self {
      Self::RowWidth { row, .. } | Self::EmptyField { row, .. } => Some(*row),
      Self::ColumnCount { .. } | Self::MissingColumns(_) => Some(1),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_faults_carry_their_row() {
    let err = Error::RowWidth { row: 4, expected: 2, found: 0 };
    assert!(err.is_file_fault());
    assert_eq!(err.row(), Some(4));
    assert!(Error::Undecodable.is_file_fault());
    assert_eq!(Error::MissingHeader.row(), None);
  }

  #[test]
  fn io_failure_is_not_a_file_fault() {
    let err = Error::from(std::io::Error::other("disk gone"));
    assert!(!err.is_file_fault());
    assert_eq!(err.to_string(), "Error validating CSV: disk gone");
  }
}
