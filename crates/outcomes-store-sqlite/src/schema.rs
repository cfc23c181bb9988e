//! SQL schema for the outcomes SQLite store.
//!
//! Executed once at connection startup. There is no migration step; the
//! version is recorded in `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Registry: one row per patient id ever ingested. Never updated.
CREATE TABLE IF NOT EXISTS patients (
    patient_id  TEXT PRIMARY KEY CHECK (length(trim(patient_id)) > 0),
    created_at  TEXT NOT NULL       -- RFC 3339 UTC; recorded_at of first batch
);

-- History is append-only apart from clearing is_current.
CREATE TABLE IF NOT EXISTS patient_outcomes (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id   TEXT NOT NULL REFERENCES patients(patient_id),
    outcome      TEXT NOT NULL CHECK (length(trim(outcome)) > 0),
    recorded_at  TEXT NOT NULL,     -- RFC 3339 UTC; shared by a whole batch
    is_current   INTEGER NOT NULL DEFAULT 1 CHECK (is_current IN (0, 1))
);

CREATE INDEX IF NOT EXISTS patient_outcomes_patient_idx
    ON patient_outcomes(patient_id, recorded_at);

-- At most one current outcome per patient.
CREATE UNIQUE INDEX IF NOT EXISTS patient_outcomes_current_idx
    ON patient_outcomes(patient_id) WHERE is_current = 1;

PRAGMA user_version = 1;
";
