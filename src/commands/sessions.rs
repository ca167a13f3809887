//! Session recording commands
//!
//! The caller-facing surface: validate form input, write the day's log and
//! keep the derived workload fields up to date.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::CommandError;
use crate::db::AppState;
use crate::models::{DailyLog, LogPatch, PostSessionInput, PreSessionInput};
use crate::pain::PainReport;
use crate::recalc::{RecalcReport, RECALC_WINDOW_LOGS};
use crate::store::{LogStore, SqliteLogStore};
use crate::workload::{session_load, workload_history, WorkloadPoint};

/// ---------------------------------------------------------------------------
/// Validation
/// ---------------------------------------------------------------------------

fn validate_rating(field: &str, value: i64) -> Result<(), CommandError> {
  if !(1..=10).contains(&value) {
    return Err(CommandError::Validation(format!(
      "{} must be between 1 and 10, got {}",
      field, value
    )));
  }
  Ok(())
}

fn validate_non_negative(field: &str, value: Option<f64>) -> Result<(), CommandError> {
  match value {
    Some(v) if !v.is_finite() || v < 0.0 => Err(CommandError::Validation(format!(
      "{} must be a non-negative number, got {}",
      field, v
    ))),
    _ => Ok(()),
  }
}

fn validate_subject(subject_id: &str) -> Result<(), CommandError> {
  if subject_id.trim().is_empty() {
    return Err(CommandError::Validation("subject_id is required".to_string()));
  }
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Pre-Session
/// ---------------------------------------------------------------------------

/// Store pre-session wellness data. Does not touch derived fields.
pub async fn record_pre_session<S: LogStore>(
  state: &AppState<S>,
  input: PreSessionInput,
) -> Result<DailyLog, CommandError> {
  validate_subject(&input.subject_id)?;
  validate_rating("pre_fatigue_rating", input.pre_fatigue_rating)?;
  if !(0..=100).contains(&input.pre_condition_score) {
    return Err(CommandError::Validation(format!(
      "pre_condition_score must be between 0 and 100, got {}",
      input.pre_condition_score
    )));
  }
  validate_non_negative("weight_kg", input.weight_kg)?;
  validate_non_negative("sleep_hours", input.sleep_hours)?;
  if input.sleep_hours.is_some_and(|h| h > 24.0) {
    return Err(CommandError::Validation("sleep_hours cannot exceed 24".to_string()));
  }

  let patch = LogPatch {
    weight_kg: input.weight_kg,
    sleep_hours: input.sleep_hours,
    pre_fatigue_rating: Some(input.pre_fatigue_rating),
    pre_condition_score: Some(input.pre_condition_score),
    pre_pain_area: input.pre_pain_area,
    ..LogPatch::new(input.subject_id.clone(), input.date)
  };
  state.store.upsert_log(&patch).await?;

  info!(subject_id = %input.subject_id, date = %input.date, "Pre-session data saved");
  load_saved(state, &input.subject_id, input.date).await
}

/// ---------------------------------------------------------------------------
/// Post-Session
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PostSessionOutcome {
  pub log: DailyLog,
  /// `None` when the recalculation could not read the subject's logs
  pub recalculation: Option<RecalcReport>,
}

/// Store post-session data with its session load, then refresh the
/// workload ratios of the subject's recent logs.
///
/// The save succeeds once its own write does; recalculation problems are
/// logged and surfaced through the outcome only.
pub async fn record_post_session<S: LogStore>(
  state: &AppState<S>,
  input: PostSessionInput,
) -> Result<PostSessionOutcome, CommandError> {
  validate_subject(&input.subject_id)?;
  let duration = input
    .duration_minutes
    .ok_or_else(|| CommandError::Validation("duration_minutes is required".to_string()))?;
  validate_non_negative("duration_minutes", Some(duration))?;
  validate_rating("post_fatigue_rating", input.post_fatigue_rating)?;

  let load = session_load(duration, input.post_fatigue_rating);
  let patch = LogPatch {
    post_fatigue_rating: Some(input.post_fatigue_rating),
    duration_minutes: Some(duration),
    post_pain_area: input.post_pain_area,
    load_score: Some(load),
    ..LogPatch::new(input.subject_id.clone(), input.date)
  };
  state.store.upsert_log(&patch).await?;
  info!(subject_id = %input.subject_id, date = %input.date, load, "Post-session data saved");

  let recalculation = match state.recalculator.recalculate_window(&input.subject_id).await {
    Ok(report) => Some(report),
    Err(e) => {
      warn!(subject_id = %input.subject_id, error = %e, "Workload recalculation skipped");
      None
    }
  };

  let log = load_saved(state, &input.subject_id, input.date).await?;
  Ok(PostSessionOutcome { log, recalculation })
}

async fn load_saved<S: LogStore>(
  state: &AppState<S>,
  subject_id: &str,
  date: NaiveDate,
) -> Result<DailyLog, CommandError> {
  state
    .store
    .get_log(subject_id, date)
    .await?
    .ok_or_else(|| CommandError::NotFound(format!("No log for {} on {}", subject_id, date)))
}

/// ---------------------------------------------------------------------------
/// Queries
/// ---------------------------------------------------------------------------

pub async fn get_daily_log<S: LogStore>(
  state: &AppState<S>,
  subject_id: &str,
  date: NaiveDate,
) -> Result<Option<DailyLog>, CommandError> {
  Ok(state.store.get_log(subject_id, date).await?)
}

/// Chart data: the subject's most recent logs with a load score, in
/// ascending date order
pub async fn get_workload_history<S: LogStore>(
  state: &AppState<S>,
  subject_id: &str,
) -> Result<Vec<WorkloadPoint>, CommandError> {
  let logs = state.store.list_recent_sessions(subject_id, RECALC_WINDOW_LOGS).await?;
  Ok(workload_history(&logs))
}

/// Pain areas reported by any subject between `from` and `to`, inclusive
pub async fn get_pain_report(
  state: &AppState<SqliteLogStore>,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<PainReport, CommandError> {
  if from > to {
    return Err(CommandError::Validation(format!(
      "Invalid range: {} is after {}",
      from, to
    )));
  }
  let logs = state.store.list_logs_between(from, to).await?;
  Ok(PainReport::from_logs(&logs, from, to))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
