//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Helper assertions

use chrono::{Duration, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::models::{DailyLog, LogPatch};
use crate::store::{LogStore, SqliteLogStore};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed post-session logs as `(days_before_today, load_score)` pairs.
/// Rating is fixed at 5 and the duration is derived from the load.
pub async fn seed_sessions(
  store: &SqliteLogStore,
  subject_id: &str,
  today: NaiveDate,
  sessions: &[(i64, f64)],
) {
  for (days_ago, load) in sessions {
    let patch = LogPatch {
      post_fatigue_rating: Some(5),
      duration_minutes: Some(load / 5.0),
      load_score: Some(*load),
      ..LogPatch::new(subject_id, days_before(today, *days_ago))
    };
    store
      .upsert_log(&patch)
      .await
      .expect("Failed to seed session");
  }
}

/// Seed a pre-session log with pain areas
pub async fn seed_pain(
  store: &SqliteLogStore,
  subject_id: &str,
  today: NaiveDate,
  days_ago: i64,
  pre_pain_area: Option<&str>,
  post_pain_area: Option<&str>,
) {
  let patch = LogPatch {
    pre_pain_area: pre_pain_area.map(str::to_string),
    post_pain_area: post_pain_area.map(str::to_string),
    ..LogPatch::new(subject_id, days_before(today, days_ago))
  };
  store.upsert_log(&patch).await.expect("Failed to seed pain log");
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Create a mock daily log with only the derived fields filled in
pub fn mock_daily_log(
  subject_id: &str,
  date: NaiveDate,
  load_score: Option<f64>,
  workload_ratio: Option<f64>,
) -> DailyLog {
  DailyLog {
    id: 0,
    subject_id: subject_id.to_string(),
    date,
    weight_kg: None,
    sleep_hours: None,
    pre_fatigue_rating: None,
    pre_condition_score: None,
    pre_pain_area: None,
    post_fatigue_rating: load_score.map(|_| 5),
    duration_minutes: load_score.map(|l| l / 5.0),
    post_pain_area: None,
    load_score,
    workload_ratio,
    created_at: None,
    updated_at: None,
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Calendar date N days before today (UTC)
/// Take this once per test; derive other dates with [`days_before`].
pub fn date_days_ago(days: i64) -> NaiveDate {
  days_before(Utc::now().date_naive(), days)
}

pub fn days_before(today: NaiveDate, days: i64) -> NaiveDate {
  today - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('daily_logs', 'team_rpe_targets')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_sessions_returns_correct_count() {
    let pool = setup_test_db().await;
    let store = SqliteLogStore::new(pool.clone());

    seed_sessions(&store, "p1", date_days_ago(0), &[(0, 100.0), (1, 200.0), (2, 300.0)]).await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_logs WHERE load_score IS NOT NULL")
      .fetch_one(&pool)
      .await
      .expect("Failed to count logs");

    assert_eq!(count, 3);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_date_helpers_produce_correct_dates() {
    let today = date_days_ago(0);
    assert_eq!((today - days_before(today, 7)).num_days(), 7);
  }
}
