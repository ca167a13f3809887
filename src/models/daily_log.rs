use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyLog {
  pub id: i64,
  pub subject_id: String,
  pub date: NaiveDate,
  // Pre-session
  pub weight_kg: Option<f64>,
  pub sleep_hours: Option<f64>,
  pub pre_fatigue_rating: Option<i64>,
  pub pre_condition_score: Option<i64>,
  pub pre_pain_area: Option<String>,
  // Post-session
  pub post_fatigue_rating: Option<i64>,
  pub duration_minutes: Option<f64>,
  pub post_pain_area: Option<String>,
  // Derived
  pub load_score: Option<f64>,
  pub workload_ratio: Option<f64>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// Tri-state update for the derived ratio column
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RatioUpdate {
  #[default]
  Keep,
  Set(f64),
  /// Not computable: stored as NULL
  Clear,
}

impl RatioUpdate {
  pub fn from_ratio(ratio: Option<f64>) -> Self {
    match ratio {
      Some(r) => RatioUpdate::Set(r),
      None => RatioUpdate::Clear,
    }
  }
}

/// Partial log for upserts keyed on (subject_id, date).
/// `None` fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogPatch {
  pub subject_id: String,
  pub date: NaiveDate,
  pub weight_kg: Option<f64>,
  pub sleep_hours: Option<f64>,
  pub pre_fatigue_rating: Option<i64>,
  pub pre_condition_score: Option<i64>,
  pub pre_pain_area: Option<String>,
  pub post_fatigue_rating: Option<i64>,
  pub duration_minutes: Option<f64>,
  pub post_pain_area: Option<String>,
  pub load_score: Option<f64>,
  pub workload_ratio: RatioUpdate,
}

impl LogPatch {
  pub fn new(subject_id: impl Into<String>, date: NaiveDate) -> Self {
    Self {
      subject_id: subject_id.into(),
      date,
      ..Default::default()
    }
  }

  /// Patch that only rewrites the derived ratio
  pub fn ratio(subject_id: impl Into<String>, date: NaiveDate, ratio: Option<f64>) -> Self {
    Self {
      workload_ratio: RatioUpdate::from_ratio(ratio),
      ..Self::new(subject_id, date)
    }
  }
}

/// Pre-session form data, as submitted by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreSessionInput {
  pub subject_id: String,
  pub date: NaiveDate,
  pub weight_kg: Option<f64>,
  pub sleep_hours: Option<f64>,
  pub pre_fatigue_rating: i64,
  pub pre_condition_score: i64,
  pub pre_pain_area: Option<String>,
}

/// Post-session form data, as submitted by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSessionInput {
  pub subject_id: String,
  pub date: NaiveDate,
  pub post_fatigue_rating: i64,
  /// Required; `None` is rejected by validation
  pub duration_minutes: Option<f64>,
  pub post_pain_area: Option<String>,
}
