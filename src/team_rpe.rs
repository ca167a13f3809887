//! Weekly team RPE: planned per-day targets against the team's mean
//! post-session rating.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{DailyLog, TeamRpeTarget};

/// Weeks offered for review: the current one plus this many before it
pub const PAST_WEEKS: usize = 8;

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
  date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Last day of the week starting at `monday`
pub fn week_end(monday: NaiveDate) -> NaiveDate {
  monday + Duration::days(6)
}

/// Week starts from [`PAST_WEEKS`] ago up to the week of `today`, oldest first
pub fn recent_week_starts(today: NaiveDate) -> Vec<NaiveDate> {
  let current = week_start(today);
  (0..=PAST_WEEKS as i64)
    .rev()
    .map(|weeks_back| current - Duration::weeks(weeks_back))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpeDay {
  pub date: NaiveDate,
  /// Short weekday name, "Mon" to "Sun"
  pub weekday: String,
  pub target_rpe: Option<f64>,
  /// Mean post-session rating across subjects; `None` without sessions
  pub actual_rpe: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRpeWeek {
  pub week_start: NaiveDate,
  pub target: Option<TeamRpeTarget>,
  /// Monday through Sunday
  pub days: Vec<RpeDay>,
}

impl TeamRpeWeek {
  /// Compare `target` with the ratings in `logs`. Logs outside the week
  /// starting at `monday` are ignored.
  pub fn compare(monday: NaiveDate, target: Option<TeamRpeTarget>, logs: &[DailyLog]) -> Self {
    let days = (0..7)
      .map(|i| {
        let date = monday + Duration::days(i);
        let ratings: Vec<f64> = logs
          .iter()
          .filter(|l| l.date == date)
          .filter_map(|l| l.post_fatigue_rating)
          .map(|r| r as f64)
          .collect();

        RpeDay {
          date,
          weekday: date.weekday().to_string(),
          target_rpe: target.as_ref().and_then(|t| t.for_weekday(date.weekday())),
          actual_rpe: (!ratings.is_empty()).then(|| ratings.iter().sum::<f64>() / ratings.len() as f64),
        }
      })
      .collect();

    Self {
      week_start: monday,
      target,
      days,
    }
  }
}
