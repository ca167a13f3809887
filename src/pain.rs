//! Pain-area tally across daily logs
//!
//! Pre- and post-session pain fields hold comma separated body areas.
//! "none" and blanks mean nothing to report.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::DailyLog;

const NO_PAIN: &str = "none";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaTally {
  /// Mentions across pre and post fields
  pub count: usize,
  /// Distinct subjects reporting the area
  pub subjects: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainReport {
  pub from: NaiveDate,
  pub to: NaiveDate,
  pub areas: BTreeMap<String, AreaTally>,
}

impl PainReport {
  /// Tally pain areas for logs dated within `from..=to`
  pub fn from_logs(logs: &[DailyLog], from: NaiveDate, to: NaiveDate) -> Self {
    let mut areas: BTreeMap<String, AreaTally> = BTreeMap::new();

    for log in logs.iter().filter(|l| l.date >= from && l.date <= to) {
      let fields = [log.pre_pain_area.as_deref(), log.post_pain_area.as_deref()];
      for area in fields.into_iter().flatten().flat_map(split_areas) {
        let tally = areas.entry(area.to_string()).or_default();
        tally.count += 1;
        tally.subjects.insert(log.subject_id.clone());
      }
    }

    Self { from, to, areas }
  }

  /// Areas ordered by mention count, most frequent first
  pub fn ranked(&self) -> Vec<(&str, usize)> {
    let mut ranked: Vec<(&str, usize)> = self
      .areas
      .iter()
      .map(|(area, tally)| (area.as_str(), tally.count))
      .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
  }
}

fn split_areas(field: &str) -> impl Iterator<Item = &str> {
  field
    .split(',')
    .map(str::trim)
    .filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case(NO_PAIN))
}
