//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, Duration, TimeZone as _, Utc};
use outcomes_core::{
  outcome::{NewOutcome, OutcomeRow},
  store::OutcomeStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap() }

fn batch(at: DateTime<Utc>, rows: &[(&str, &str)]) -> Vec<NewOutcome> {
  rows
    .iter()
    .map(|(id, outcome)| NewOutcome::new(*id, *outcome, at))
    .collect()
}

fn summary(rows: &[OutcomeRow]) -> Vec<(&str, &str, bool)> {
  rows
    .iter()
    .map(|r| (r.patient_id.as_str(), r.outcome.as_str(), r.is_current))
    .collect()
}

// ─── Single batch ────────────────────────────────────────────────────────────

#[tokio::test]
async fn last_row_for_a_patient_becomes_current() {
  let s = store().await;

  let saved = s
    .save(batch(t0(), &[("P1", "improved"), ("P2", "stable"), ("P1", "relapsed")]))
    .await
    .unwrap();
  assert_eq!(saved.records, 3);
  assert_eq!(saved.new_patients, 2);
  assert_eq!(saved.recorded_at, Some(t0()));

  let all = s.list_all().await.unwrap();
  assert_eq!(summary(&all), vec![
    ("P1", "improved", false),
    ("P1", "relapsed", true),
    ("P2", "stable", true),
  ]);
  assert!(all.iter().all(|r| r.recorded_at == t0() && r.created_at == t0()));
}

#[tokio::test]
async fn empty_batch_writes_nothing() {
  let s = store().await;
  let saved = s.save(Vec::new()).await.unwrap();
  assert_eq!(saved.records, 0);
  assert_eq!(saved.new_patients, 0);
  assert_eq!(saved.recorded_at, None);
  assert!(s.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_ascii_outcomes_round_trip() {
  let s = store().await;
  let outcome = "\u{201C}amélioré\u{201D} \u{2013} 5\u{20AC}";
  s.save(batch(t0(), &[("P1", outcome)])).await.unwrap();

  let all = s.list_all().await.unwrap();
  assert_eq!(all[0].outcome, outcome);
}

// ─── Across batches ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reingesting_a_file_appends_and_moves_current() {
  let s = store().await;
  let rows = [("P1", "improved"), ("P2", "stable")];
  let t1 = t0() + Duration::hours(1);

  s.save(batch(t0(), &rows)).await.unwrap();
  let second = s.save(batch(t1, &rows)).await.unwrap();
  assert_eq!(second.new_patients, 0);

  for id in ["P1", "P2"] {
    let history = s.patient_history(id).await.unwrap();
    assert_eq!(history.len(), 2, "{id}");
    assert!(!history[0].is_current);
    assert!(history[1].is_current);
    assert_eq!(history[1].recorded_at, t1);
  }
}

#[tokio::test]
async fn created_at_is_fixed_at_first_appearance() {
  let s = store().await;
  let t1 = t0() + Duration::days(3);

  s.save(batch(t0(), &[("P1", "admitted")])).await.unwrap();
  s.save(batch(t1, &[("P1", "discharged"), ("P2", "admitted")]))
    .await
    .unwrap();

  assert_eq!(s.get_patient("P1").await.unwrap().unwrap().created_at, t0());
  assert_eq!(s.get_patient("P2").await.unwrap().unwrap().created_at, t1);
  assert!(s.get_patient("P3").await.unwrap().is_none());
}

#[tokio::test]
async fn list_all_orders_by_patient_then_time() {
  let s = store().await;
  let t1 = t0() + Duration::minutes(5);

  s.save(batch(t0(), &[("B", "first"), ("A", "first")])).await.unwrap();
  s.save(batch(t1, &[("A", "second"), ("B", "second")])).await.unwrap();

  let all = s.list_all().await.unwrap();
  assert_eq!(summary(&all), vec![
    ("A", "first", false),
    ("A", "second", true),
    ("B", "first", false),
    ("B", "second", true),
  ]);
}

#[tokio::test]
async fn current_outcomes_has_one_row_per_patient() {
  let s = store().await;
  let t1 = t0() + Duration::minutes(1);

  s.save(batch(t0(), &[("P2", "stable"), ("P1", "improved")])).await.unwrap();
  s.save(batch(t1, &[("P1", "relapsed"), ("P1", "remission")]))
    .await
    .unwrap();

  let current = s.current_outcomes().await.unwrap();
  assert_eq!(summary(&current), vec![
    ("P1", "remission", true),
    ("P2", "stable", true),
  ]);
}

#[tokio::test]
async fn patient_history_is_oldest_first() {
  let s = store().await;
  let t1 = t0() + Duration::seconds(30);

  s.save(batch(t0(), &[("P1", "a"), ("P1", "b")])).await.unwrap();
  s.save(batch(t1, &[("P1", "c")])).await.unwrap();

  let history = s.patient_history("P1").await.unwrap();
  let outcomes: Vec<_> = history.iter().map(|r| r.outcome.as_str()).collect();
  assert_eq!(outcomes, ["a", "b", "c"]);
  assert!(history.windows(2).all(|w| w[0].id < w[1].id));
  assert!(s.patient_history("nobody").await.unwrap().is_empty());
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_row_rolls_back_the_whole_batch() {
  let s = store().await;
  s.save(batch(t0(), &[("P1", "improved")])).await.unwrap();
  let before = s.list_all().await.unwrap();

  let err = s
    .save(batch(t0() + Duration::hours(1), &[
      ("P2", "stable"),
      ("P1", "relapsed"),
      ("P3", "   "),
    ]))
    .await
    .unwrap_err();
  assert!(err.is_constraint_violation(), "{err}");

  assert_eq!(s.list_all().await.unwrap(), before);
  assert!(s.get_patient("P2").await.unwrap().is_none());
  assert!(s.get_patient("P3").await.unwrap().is_none());
}

#[tokio::test]
async fn blank_patient_id_is_refused() {
  let s = store().await;
  let err = s.save(batch(t0(), &[(" ", "stable")])).await.unwrap_err();
  assert!(err.is_constraint_violation(), "{err}");
  assert!(s.list_all().await.unwrap().is_empty());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_store_survives_reopen() {
  let path = std::env::temp_dir().join(format!(
    "outcomes-store-{}-{}.sqlite3",
    std::process::id(),
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
  ));

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.save(batch(t0(), &[("P1", "improved")])).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let all = s.list_all().await.unwrap();
  assert_eq!(summary(&all), vec![("P1", "improved", true)]);

  drop(s);
  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}
