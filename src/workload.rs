//! Deterministic workload layer for daily logs
//!
//! Session load (sRPE), the rolling acute:chronic workload ratio (ACWR)
//! and the risk band derived from it. Everything here is pure: the
//! recalculation and command layers feed it data and persist the results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::DailyLog;

/// Trailing acute window, present day included (offsets 0..=6)
pub const ACUTE_WINDOW_DAYS: i64 = 7;

/// Trailing chronic window, present day included (offsets 0..=27)
pub const CHRONIC_WINDOW_DAYS: i64 = 28;

/// Minimum samples in the chronic window before a ratio is reported
pub const MIN_CHRONIC_SAMPLES: usize = 7;

/// ---------------------------------------------------------------------------
/// Session Load
/// ---------------------------------------------------------------------------

/// Session load (sRPE): duration in minutes times post-session RPE.
///
/// Inputs are validated by the caller; no clamping or rounding happens here.
pub fn session_load(duration_minutes: f64, post_fatigue_rating: i64) -> f64 {
  duration_minutes * post_fatigue_rating as f64
}

/// ---------------------------------------------------------------------------
/// Rolling Windows
/// ---------------------------------------------------------------------------

/// One dated load value for window aggregation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSample {
  pub date: NaiveDate,
  pub load_score: f64,
}

impl WindowSample {
  pub fn new(date: NaiveDate, load_score: f64) -> Self {
    Self { date, load_score }
  }

  /// Extract a sample from a log; logs without a load score have none
  pub fn from_log(log: &DailyLog) -> Option<Self> {
    log.load_score.map(|load| Self::new(log.date, load))
  }

  /// Whole calendar days between this sample and `target` (positive = in the past)
  fn offset_from(&self, target: NaiveDate) -> i64 {
    (target - self.date).num_days()
  }
}

/// Collect window samples from a set of logs, skipping logs without a load
pub fn samples_from_logs(logs: &[DailyLog]) -> Vec<WindowSample> {
  logs.iter().filter_map(WindowSample::from_log).collect()
}

/// Acute and chronic means anchored at one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkloadWindow {
  pub target_date: NaiveDate,
  /// Mean load over the trailing 7 days
  pub acute_load: f64,
  /// Mean load over the trailing 28 days
  pub chronic_load: f64,
  pub acute_samples: usize,
  pub chronic_samples: usize,
}

impl WorkloadWindow {
  pub fn ratio(&self) -> f64 {
    self.acute_load / self.chronic_load
  }
}

/// Compute the acute/chronic window for `target`.
///
/// Returns `None` when the ratio is not computable: fewer than
/// [`MIN_CHRONIC_SAMPLES`] samples in the chronic window, no samples in the
/// acute window, or a chronic mean of zero.
pub fn workload_window(series: &[WindowSample], target: NaiveDate) -> Option<WorkloadWindow> {
  let chronic: Vec<(i64, f64)> = series
    .iter()
    .map(|s| (s.offset_from(target), s.load_score))
    .filter(|(offset, _)| (0..CHRONIC_WINDOW_DAYS).contains(offset))
    .collect();

  if chronic.len() < MIN_CHRONIC_SAMPLES {
    return None;
  }

  let acute: Vec<f64> = chronic
    .iter()
    .filter(|(offset, _)| *offset < ACUTE_WINDOW_DAYS)
    .map(|(_, load)| *load)
    .collect();

  if acute.is_empty() {
    return None;
  }

  let acute_load = mean(&acute);
  let chronic_load = chronic.iter().map(|(_, load)| load).sum::<f64>() / chronic.len() as f64;

  if chronic_load == 0.0 {
    return None;
  }

  Some(WorkloadWindow {
    target_date: target,
    acute_load,
    chronic_load,
    acute_samples: acute.len(),
    chronic_samples: chronic.len(),
  })
}

/// Acute:chronic workload ratio at `target`, or `None` if not computable
pub fn workload_ratio(series: &[WindowSample], target: NaiveDate) -> Option<f64> {
  workload_window(series, target).map(|w| w.ratio())
}

fn mean(values: &[f64]) -> f64 {
  values.iter().sum::<f64>() / values.len() as f64
}

/// ---------------------------------------------------------------------------
/// Risk Classification
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
  Safe,    // 0.8 - 1.3
  Warning, // < 0.8 or (1.3, 1.5]
  Danger,  // > 1.5
}

impl RiskLevel {
  /// Classify a ratio. NaN compares false everywhere and lands in Danger.
  pub fn from_ratio(ratio: f64) -> Self {
    if (0.8..=1.3).contains(&ratio) {
      RiskLevel::Safe
    } else if ratio < 0.8 || (ratio > 1.3 && ratio <= 1.5) {
      RiskLevel::Warning
    } else {
      RiskLevel::Danger
    }
  }

  /// Classify a possibly non-computable ratio; `None` stays unclassified
  pub fn for_ratio(ratio: Option<f64>) -> Option<Self> {
    ratio.map(Self::from_ratio)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      RiskLevel::Safe => "safe",
      RiskLevel::Warning => "warning",
      RiskLevel::Danger => "danger",
    }
  }
}

impl std::fmt::Display for RiskLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for RiskLevel {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "safe" => Ok(Self::Safe),
      "warning" => Ok(Self::Warning),
      "danger" => Ok(Self::Danger),
      _ => Err(format!("Unknown risk level: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Chart Points
/// ---------------------------------------------------------------------------

/// One day of workload history for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadPoint {
  pub date: NaiveDate,
  pub load_score: f64,
  pub workload_ratio: Option<f64>,
  pub risk: Option<RiskLevel>,
}

impl WorkloadPoint {
  pub fn from_log(log: &DailyLog) -> Option<Self> {
    let load_score = log.load_score?;
    Some(Self {
      date: log.date,
      load_score,
      workload_ratio: log.workload_ratio,
      risk: RiskLevel::for_ratio(log.workload_ratio),
    })
  }
}

/// Chart points in ascending date order; logs without a load are skipped
pub fn workload_history(logs: &[DailyLog]) -> Vec<WorkloadPoint> {
  let mut points: Vec<WorkloadPoint> = logs.iter().filter_map(WorkloadPoint::from_log).collect();
  points.sort_by_key(|p| p.date);
  points
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use chrono::Duration;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  /// Samples at the given day offsets before `target`, all with `load`
  fn samples_at(target: NaiveDate, offsets: &[i64], load: f64) -> Vec<WindowSample> {
    offsets
      .iter()
      .map(|o| WindowSample::new(target - Duration::days(*o), load))
      .collect()
  }

  #[test]
  fn test_session_load_multiplies() {
    assert_eq!(session_load(90.0, 7), 630.0);
    assert_eq!(session_load(0.0, 10), 0.0);
    assert_eq!(session_load(45.5, 3), 136.5);
  }

  #[test]
  fn test_session_load_no_rounding() {
    let d = 33.333;
    assert_eq!(session_load(d, 9), d * 9.0);
  }

  #[test]
  fn test_ratio_none_with_fewer_than_seven_samples() {
    let target = day(2024, 3, 31);
    let series = samples_at(target, &[0, 1, 2, 3, 4, 5], 300.0);
    assert_eq!(workload_ratio(&series, target), None);
  }

  #[test]
  fn test_ratio_is_one_for_flat_week() {
    let target = day(2024, 3, 31);
    let series = samples_at(target, &[0, 1, 2, 3, 4, 5, 6], 420.0);
    assert_eq!(workload_ratio(&series, target), Some(1.0));
  }

  #[test]
  fn test_ratio_is_acute_over_chronic() {
    let target = day(2024, 3, 31);
    // Acute: 3 samples of 600. Chronic adds 5 older samples of 200.
    let mut series = samples_at(target, &[0, 2, 4], 600.0);
    series.extend(samples_at(target, &[8, 12, 16, 20, 24], 200.0));

    let window = workload_window(&series, target).expect("computable");
    assert_eq!(window.acute_samples, 3);
    assert_eq!(window.chronic_samples, 8);
    assert_approx_eq!(window.acute_load, 600.0, 1e-9);
    assert_approx_eq!(window.chronic_load, (3.0 * 600.0 + 5.0 * 200.0) / 8.0, 1e-9);
    assert_approx_eq!(window.ratio(), 600.0 / 350.0, 1e-9);
  }

  #[test]
  fn test_offset_six_is_acute_offset_seven_is_not() {
    let target = day(2024, 3, 31);
    let base = samples_at(target, &[0, 10, 11, 12, 13, 14], 100.0);

    let mut inside = base.clone();
    inside.push(WindowSample::new(target - Duration::days(6), 800.0));
    let mut outside = base;
    outside.push(WindowSample::new(target - Duration::days(7), 800.0));

    let with_inside = workload_window(&inside, target).unwrap();
    let with_outside = workload_window(&outside, target).unwrap();

    // Same chronic mean either way; only the acute side moves
    assert_approx_eq!(with_inside.chronic_load, with_outside.chronic_load, 1e-9);
    assert_eq!(with_inside.acute_samples, 2);
    assert_eq!(with_outside.acute_samples, 1);
    assert_approx_eq!(with_inside.acute_load, 450.0, 1e-9);
    assert_approx_eq!(with_outside.acute_load, 100.0, 1e-9);
  }

  #[test]
  fn test_chronic_window_excludes_offset_28_and_future() {
    let target = day(2024, 3, 31);
    let mut series = samples_at(target, &[0, 1, 2, 3, 4, 5, 27], 100.0);
    // Offset 27 is the seventh chronic sample; without it there is no ratio
    let baseline = workload_ratio(&series, target);
    assert_eq!(baseline, Some(1.0));
    assert_eq!(workload_ratio(&series[..6], target), None);

    series.push(WindowSample::new(target - Duration::days(28), 10_000.0));
    series.push(WindowSample::new(target + Duration::days(1), 10_000.0));

    assert_eq!(workload_ratio(&series, target), baseline);
  }

  #[test]
  fn test_ratio_none_without_acute_samples() {
    let target = day(2024, 3, 31);
    let series = samples_at(target, &[7, 8, 9, 10, 11, 12, 13, 14], 250.0);
    assert_eq!(workload_ratio(&series, target), None);
  }

  #[test]
  fn test_ratio_none_when_chronic_load_is_zero() {
    let target = day(2024, 3, 31);
    let series = samples_at(target, &[0, 1, 2, 3, 4, 5, 6, 7], 0.0);
    assert_eq!(workload_ratio(&series, target), None);
  }

  #[test]
  fn test_input_order_does_not_matter() {
    let target = day(2024, 3, 31);
    let mut series = samples_at(target, &[0, 3, 6, 9, 12, 15, 18, 21], 0.0);
    for (i, s) in series.iter_mut().enumerate() {
      s.load_score = 100.0 + i as f64 * 40.0;
    }
    let forward = workload_ratio(&series, target);
    series.reverse();
    assert_eq!(workload_ratio(&series, target), forward);
  }

  #[test]
  fn test_offsets_span_month_and_leap_day() {
    // 2024-02-29 exists; Mar 6 is exactly 6 days later
    let target = day(2024, 3, 6);
    let sample = WindowSample::new(day(2024, 2, 29), 1.0);
    assert_eq!(sample.offset_from(target), 6);
  }

  #[test]
  fn test_risk_thresholds() {
    assert_eq!(RiskLevel::from_ratio(0.8), RiskLevel::Safe);
    assert_eq!(RiskLevel::from_ratio(1.0), RiskLevel::Safe);
    assert_eq!(RiskLevel::from_ratio(1.3), RiskLevel::Safe);
    assert_eq!(RiskLevel::from_ratio(1.31), RiskLevel::Warning);
    assert_eq!(RiskLevel::from_ratio(1.5), RiskLevel::Warning);
    assert_eq!(RiskLevel::from_ratio(1.51), RiskLevel::Danger);
    assert_eq!(RiskLevel::from_ratio(0.79), RiskLevel::Warning);
    assert_eq!(RiskLevel::from_ratio(0.0), RiskLevel::Warning);
  }

  #[test]
  fn test_non_computable_ratio_is_unclassified() {
    assert_eq!(RiskLevel::for_ratio(None), None);
    assert_eq!(RiskLevel::for_ratio(Some(1.6)), Some(RiskLevel::Danger));
  }

  #[test]
  fn test_risk_level_string_roundtrip() {
    for level in [RiskLevel::Safe, RiskLevel::Warning, RiskLevel::Danger] {
      assert_eq!(level.to_string().parse::<RiskLevel>(), Ok(level));
    }
    assert!("extreme".parse::<RiskLevel>().is_err());
    assert_eq!(serde_json::to_string(&RiskLevel::Danger).unwrap(), "\"danger\"");
  }

  #[test]
  fn test_history_skips_logs_without_load_and_sorts() {
    let logs = vec![
      crate::test_utils::mock_daily_log("p1", day(2024, 3, 3), Some(300.0), Some(1.4)),
      crate::test_utils::mock_daily_log("p1", day(2024, 3, 2), None, None),
      crate::test_utils::mock_daily_log("p1", day(2024, 3, 1), Some(200.0), None),
    ];

    let points = workload_history(&logs);
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, day(2024, 3, 1));
    assert_eq!(points[0].risk, None);
    assert_eq!(points[1].risk, Some(RiskLevel::Warning));
  }
}
