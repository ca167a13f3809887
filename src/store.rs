//! Daily log persistence
//!
//! The engine only reaches storage through [`LogStore`]: point lookup,
//! keyed upsert and a bounded "most recent" listing. [`SqliteLogStore`]
//! is the default implementation on top of a sqlx pool.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::models::{DailyLog, LogPatch, RatioUpdate, TeamRpeTarget};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Store unavailable: {0}")]
  Unavailable(String),
}

/// ---------------------------------------------------------------------------
/// Store Contract
/// ---------------------------------------------------------------------------

#[async_trait]
pub trait LogStore: Send + Sync + 'static {
  /// The log for one subject and date, if any
  async fn get_log(&self, subject_id: &str, date: NaiveDate) -> Result<Option<DailyLog>, StoreError>;

  /// Insert or merge a partial log, keyed on (subject_id, date)
  async fn upsert_log(&self, patch: &LogPatch) -> Result<(), StoreError>;

  /// Up to `limit` logs for the subject, newest date first
  async fn list_recent_logs(&self, subject_id: &str, limit: i64) -> Result<Vec<DailyLog>, StoreError>;

  /// Like [`LogStore::list_recent_logs`], counting only logs with a load score
  async fn list_recent_sessions(&self, subject_id: &str, limit: i64) -> Result<Vec<DailyLog>, StoreError>;
}

/// ---------------------------------------------------------------------------
/// SQLite Implementation
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SqliteLogStore {
  pool: SqlitePool,
}

impl SqliteLogStore {
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &SqlitePool {
    &self.pool
  }

  /// All logs across subjects with `from <= date <= to`, oldest first
  pub async fn list_logs_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyLog>, StoreError> {
    let logs = sqlx::query_as::<_, DailyLog>(
      r#"
      SELECT * FROM daily_logs
      WHERE date >= ?1 AND date <= ?2
      ORDER BY date ASC, subject_id ASC
      "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(&self.pool)
    .await?;

    Ok(logs)
  }
}

/// ---------------------------------------------------------------------------
/// Team RPE Targets
/// ---------------------------------------------------------------------------

impl SqliteLogStore {
  pub async fn get_rpe_target(&self, week_start: NaiveDate) -> Result<Option<TeamRpeTarget>, StoreError> {
    let target = sqlx::query_as::<_, TeamRpeTarget>(
      r#"
      SELECT week_start, monday, tuesday, wednesday, thursday, friday, saturday, sunday, updated_at
      FROM team_rpe_targets
      WHERE week_start = ?1
      "#,
    )
    .bind(week_start)
    .fetch_optional(&self.pool)
    .await?;

    Ok(target)
  }

  /// Insert or replace the whole week; unset days are stored as NULL
  pub async fn upsert_rpe_target(&self, target: &TeamRpeTarget) -> Result<(), StoreError> {
    sqlx::query(
      r#"
      INSERT INTO team_rpe_targets (
        week_start, monday, tuesday, wednesday, thursday, friday, saturday, sunday, updated_at
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
      ON CONFLICT(week_start) DO UPDATE SET
        monday = excluded.monday,
        tuesday = excluded.tuesday,
        wednesday = excluded.wednesday,
        thursday = excluded.thursday,
        friday = excluded.friday,
        saturday = excluded.saturday,
        sunday = excluded.sunday,
        updated_at = excluded.updated_at
      "#,
    )
    .bind(target.week_start)
    .bind(target.monday)
    .bind(target.tuesday)
    .bind(target.wednesday)
    .bind(target.thursday)
    .bind(target.friday)
    .bind(target.saturday)
    .bind(target.sunday)
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;

    Ok(())
  }
}

#[async_trait]
impl LogStore for SqliteLogStore {
  async fn get_log(&self, subject_id: &str, date: NaiveDate) -> Result<Option<DailyLog>, StoreError> {
    let log = sqlx::query_as::<_, DailyLog>(
      "SELECT * FROM daily_logs WHERE subject_id = ?1 AND date = ?2",
    )
    .bind(subject_id)
    .bind(date)
    .fetch_optional(&self.pool)
    .await?;

    Ok(log)
  }

  async fn upsert_log(&self, patch: &LogPatch) -> Result<(), StoreError> {
    let (set_ratio, ratio) = match patch.workload_ratio {
      RatioUpdate::Keep => (false, None),
      RatioUpdate::Set(r) => (true, Some(r)),
      RatioUpdate::Clear => (true, None),
    };

    sqlx::query(
      r#"
      INSERT INTO daily_logs (
        subject_id, date,
        weight_kg, sleep_hours, pre_fatigue_rating, pre_condition_score, pre_pain_area,
        post_fatigue_rating, duration_minutes, post_pain_area,
        load_score, workload_ratio, updated_at
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
      ON CONFLICT(subject_id, date) DO UPDATE SET
        weight_kg = COALESCE(excluded.weight_kg, daily_logs.weight_kg),
        sleep_hours = COALESCE(excluded.sleep_hours, daily_logs.sleep_hours),
        pre_fatigue_rating = COALESCE(excluded.pre_fatigue_rating, daily_logs.pre_fatigue_rating),
        pre_condition_score = COALESCE(excluded.pre_condition_score, daily_logs.pre_condition_score),
        pre_pain_area = COALESCE(excluded.pre_pain_area, daily_logs.pre_pain_area),
        post_fatigue_rating = COALESCE(excluded.post_fatigue_rating, daily_logs.post_fatigue_rating),
        duration_minutes = COALESCE(excluded.duration_minutes, daily_logs.duration_minutes),
        post_pain_area = COALESCE(excluded.post_pain_area, daily_logs.post_pain_area),
        load_score = COALESCE(excluded.load_score, daily_logs.load_score),
        workload_ratio = CASE WHEN ?14 THEN excluded.workload_ratio ELSE daily_logs.workload_ratio END,
        updated_at = excluded.updated_at
      "#,
    )
    .bind(&patch.subject_id)
    .bind(patch.date)
    .bind(patch.weight_kg)
    .bind(patch.sleep_hours)
    .bind(patch.pre_fatigue_rating)
    .bind(patch.pre_condition_score)
    .bind(&patch.pre_pain_area)
    .bind(patch.post_fatigue_rating)
    .bind(patch.duration_minutes)
    .bind(&patch.post_pain_area)
    .bind(patch.load_score)
    .bind(ratio)
    .bind(Utc::now())
    .bind(set_ratio)
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  async fn list_recent_logs(&self, subject_id: &str, limit: i64) -> Result<Vec<DailyLog>, StoreError> {
    let logs = sqlx::query_as::<_, DailyLog>(
      r#"
      SELECT * FROM daily_logs
      WHERE subject_id = ?1
      ORDER BY date DESC
      LIMIT ?2
      "#,
    )
    .bind(subject_id)
    .bind(limit)
    .fetch_all(&self.pool)
    .await?;

    Ok(logs)
  }

  async fn list_recent_sessions(&self, subject_id: &str, limit: i64) -> Result<Vec<DailyLog>, StoreError> {
    let logs = sqlx::query_as::<_, DailyLog>(
      r#"
      SELECT * FROM daily_logs
      WHERE subject_id = ?1 AND load_score IS NOT NULL
      ORDER BY date DESC
      LIMIT ?2
      "#,
    )
    .bind(subject_id)
    .bind(limit)
    .fetch_all(&self.pool)
    .await?;

    Ok(logs)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
