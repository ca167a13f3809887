use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Planned team RPE for each day of one week. `None` means no target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamRpeTarget {
  /// Monday of the week
  pub week_start: NaiveDate,
  pub monday: Option<f64>,
  pub tuesday: Option<f64>,
  pub wednesday: Option<f64>,
  pub thursday: Option<f64>,
  pub friday: Option<f64>,
  pub saturday: Option<f64>,
  pub sunday: Option<f64>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

impl TeamRpeTarget {
  /// Targets in Monday..Sunday order
  pub fn new(week_start: NaiveDate, days: [Option<f64>; 7]) -> Self {
    let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = days;
    Self {
      week_start,
      monday,
      tuesday,
      wednesday,
      thursday,
      friday,
      saturday,
      sunday,
      updated_at: None,
    }
  }

  pub fn days(&self) -> [Option<f64>; 7] {
    [
      self.monday,
      self.tuesday,
      self.wednesday,
      self.thursday,
      self.friday,
      self.saturday,
      self.sunday,
    ]
  }

  pub fn for_weekday(&self, weekday: Weekday) -> Option<f64> {
    self.days()[weekday.num_days_from_monday() as usize]
  }
}
