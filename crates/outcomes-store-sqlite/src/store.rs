//! [`SqliteStore`], the SQLite implementation of [`OutcomeStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use outcomes_core::{
  outcome::{BatchSummary, NewOutcome, OutcomeRecord, OutcomeRow},
  patient::Patient,
  store::OutcomeStore,
};

use crate::{
  Result,
  encode::{RawOutcomeRecord, RawOutcomeRow, RawPatient, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A patient outcomes store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a joined `patients` × `patient_outcomes` query.
  async fn query_rows(&self, sql: String) -> Result<Vec<OutcomeRow>> {
    let raws: Vec<RawOutcomeRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawOutcomeRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOutcomeRow::into_row).collect()
  }
}

// ─── OutcomeStore impl ───────────────────────────────────────────────────────

impl OutcomeStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn save(&self, records: Vec<NewOutcome>) -> Result<BatchSummary> {
    let recorded_at = records.first().map(|r| r.recorded_at);
    if records.is_empty() {
      return Ok(BatchSummary { recorded_at, records: 0, new_patients: 0 });
    }

    let count = records.len();
    let rows: Vec<(String, String, String)> = records
      .into_iter()
      .map(|r| (r.patient_id, r.outcome, encode_dt(r.recorded_at)))
      .collect();

    let new_patients = self
      .conn
      .call(move |conn| {
        // Dropping `tx` on any early return rolls the whole batch back.
        let tx = conn.transaction()?;
        let mut new_patients = 0usize;
        {
          let mut find = tx
            .prepare_cached("SELECT 1 FROM patients WHERE patient_id = ?1")?;
          let mut register = tx.prepare_cached(
            "INSERT INTO patients (patient_id, created_at) VALUES (?1, ?2)",
          )?;
          let mut retire = tx.prepare_cached(
            "UPDATE patient_outcomes SET is_current = 0
             WHERE patient_id = ?1 AND is_current = 1",
          )?;
          let mut append = tx.prepare_cached(
            "INSERT INTO patient_outcomes (patient_id, outcome, recorded_at, is_current)
             VALUES (?1, ?2, ?3, 1)",
          )?;

          for (patient_id, outcome, recorded_at) in &rows {
            if !find.exists(rusqlite::params![patient_id])? {
              register.execute(rusqlite::params![patient_id, recorded_at])?;
              new_patients += 1;
            }
            retire.execute(rusqlite::params![patient_id])?;
            append.execute(rusqlite::params![patient_id, outcome, recorded_at])?;
          }
        }
        tx.commit()?;
        Ok(new_patients)
      })
      .await?;

    Ok(BatchSummary { recorded_at, records: count, new_patients })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_all(&self) -> Result<Vec<OutcomeRow>> {
    self
      .query_rows(format!(
        "SELECT {}
         FROM patients p
         JOIN patient_outcomes po ON po.patient_id = p.patient_id
         ORDER BY p.patient_id, po.recorded_at, po.id",
        RawOutcomeRow::COLUMNS
      ))
      .await
  }

  async fn current_outcomes(&self) -> Result<Vec<OutcomeRow>> {
    self
      .query_rows(format!(
        "SELECT {}
         FROM patients p
         JOIN patient_outcomes po ON po.patient_id = p.patient_id
         WHERE po.is_current = 1
         ORDER BY p.patient_id",
        RawOutcomeRow::COLUMNS
      ))
      .await
  }

  async fn get_patient(&self, patient_id: &str) -> Result<Option<Patient>> {
    let id = patient_id.to_owned();

    let raw: Option<RawPatient> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT patient_id, created_at FROM patients WHERE patient_id = ?1",
            rusqlite::params![id],
            |row| {
              Ok(RawPatient {
                patient_id: row.get(0)?,
                created_at: row.get(1)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPatient::into_patient).transpose()
  }

  async fn patient_history(&self, patient_id: &str) -> Result<Vec<OutcomeRecord>> {
    let id = patient_id.to_owned();

    let raws: Vec<RawOutcomeRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, patient_id, outcome, recorded_at, is_current
           FROM patient_outcomes
           WHERE patient_id = ?1
           ORDER BY recorded_at, id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id], RawOutcomeRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOutcomeRecord::into_record).collect()
  }
}
