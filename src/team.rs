//! Team overview: per-subject averages and a daily team series
//!
//! Each subject is summarized over their most recent logs. The series
//! averages load and workload ratio across subjects for every date where
//! both are known.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::DailyLog;

/// Logs per subject that feed the averages
pub const TEAM_RECENT_LOGS: usize = 28;
/// Dates kept in the team series
pub const TEAM_SERIES_DAYS: usize = 28;

/// ---------------------------------------------------------------------------
/// Averages
/// ---------------------------------------------------------------------------

/// Mean of each field over the values present; `None` when none are
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
  pub weight_kg: Option<f64>,
  pub sleep_hours: Option<f64>,
  pub pre_fatigue_rating: Option<f64>,
  pub pre_condition_score: Option<f64>,
  pub post_fatigue_rating: Option<f64>,
  pub duration_minutes: Option<f64>,
  pub load_score: Option<f64>,
  pub workload_ratio: Option<f64>,
}

impl Averages {
  fn from_logs(logs: &[&DailyLog]) -> Self {
    Self {
      weight_kg: mean_of(logs.iter().map(|l| l.weight_kg)),
      sleep_hours: mean_of(logs.iter().map(|l| l.sleep_hours)),
      pre_fatigue_rating: mean_of(logs.iter().map(|l| l.pre_fatigue_rating.map(|r| r as f64))),
      pre_condition_score: mean_of(logs.iter().map(|l| l.pre_condition_score.map(|s| s as f64))),
      post_fatigue_rating: mean_of(logs.iter().map(|l| l.post_fatigue_rating.map(|r| r as f64))),
      duration_minutes: mean_of(logs.iter().map(|l| l.duration_minutes)),
      load_score: mean_of(logs.iter().map(|l| l.load_score)),
      workload_ratio: mean_of(logs.iter().map(|l| l.workload_ratio)),
    }
  }

  /// Team row: each field averaged over the subjects that have it
  fn across(subjects: &[SubjectAverages]) -> Self {
    let field = |get: fn(&Averages) -> Option<f64>| mean_of(subjects.iter().map(|s| get(&s.averages)));
    Self {
      weight_kg: field(|a| a.weight_kg),
      sleep_hours: field(|a| a.sleep_hours),
      pre_fatigue_rating: field(|a| a.pre_fatigue_rating),
      pre_condition_score: field(|a| a.pre_condition_score),
      post_fatigue_rating: field(|a| a.post_fatigue_rating),
      duration_minutes: field(|a| a.duration_minutes),
      load_score: field(|a| a.load_score),
      workload_ratio: field(|a| a.workload_ratio),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAverages {
  pub subject_id: String,
  /// Logs considered, with or without data in any given field
  pub log_count: usize,
  #[serde(flatten)]
  pub averages: Averages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDay {
  pub date: NaiveDate,
  pub load_score: f64,
  pub workload_ratio: f64,
  /// Subjects contributing to this date
  pub subjects: usize,
}

/// ---------------------------------------------------------------------------
/// Report
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamReport {
  /// Ordered by subject id
  pub subjects: Vec<SubjectAverages>,
  pub team: Averages,
  /// Ascending by date, at most [`TEAM_SERIES_DAYS`] entries
  pub series: Vec<TeamDay>,
}

impl TeamReport {
  pub fn from_logs(logs: &[DailyLog]) -> Self {
    let mut by_subject: BTreeMap<&str, Vec<&DailyLog>> = BTreeMap::new();
    for log in logs {
      by_subject.entry(log.subject_id.as_str()).or_default().push(log);
    }

    let subjects: Vec<SubjectAverages> = by_subject
      .into_iter()
      .map(|(subject_id, mut logs)| {
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        logs.truncate(TEAM_RECENT_LOGS);
        SubjectAverages {
          subject_id: subject_id.to_string(),
          log_count: logs.len(),
          averages: Averages::from_logs(&logs),
        }
      })
      .collect();

    Self {
      team: Averages::across(&subjects),
      series: team_series(logs),
      subjects,
    }
  }
}

fn team_series(logs: &[DailyLog]) -> Vec<TeamDay> {
  let mut by_date: BTreeMap<NaiveDate, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
  for log in logs {
    if let (Some(load), Some(ratio)) = (log.load_score, log.workload_ratio) {
      let (loads, ratios) = by_date.entry(log.date).or_default();
      loads.push(load);
      ratios.push(ratio);
    }
  }

  let skip = by_date.len().saturating_sub(TEAM_SERIES_DAYS);
  by_date
    .into_iter()
    .skip(skip)
    .map(|(date, (loads, ratios))| TeamDay {
      date,
      load_score: loads.iter().sum::<f64>() / loads.len() as f64,
      workload_ratio: ratios.iter().sum::<f64>() / ratios.len() as f64,
      subjects: loads.len(),
    })
    .collect()
}

fn mean_of(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
  let (sum, count) = values.flatten().fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
  (count > 0).then(|| sum / count as f64)
}
