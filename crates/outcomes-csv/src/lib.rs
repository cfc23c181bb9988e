//! Validator for patient outcome CSV uploads.
//!
//! Decodes raw bytes through an [`EncodingChain`], checks the two-column
//! `Patient ID` / `Outcome` layout row by row, and turns a valid file into a
//! batch of [`NewOutcome`](outcomes_core::outcome::NewOutcome) records.
//!
//! ```rust,ignore
//! let verdict = outcomes_csv::validate(&bytes, &EncodingChain::default());
//! if verdict.is_valid { /* ... */ }
//! ```

pub mod encoding;
pub mod error;
pub mod header;
pub mod validate;

pub use encoding::{Encoding, EncodingChain};
pub use error::{Error, Result};
pub use header::{HeaderMap, OUTCOME, PATIENT_ID, REQUIRED_COLUMNS};
pub use validate::{OutcomeTable, ValidatedRow, Verdict, parse, validate, validate_path};
