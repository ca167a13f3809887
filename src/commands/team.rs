//! Staff-facing team views

use chrono::NaiveDate;
use tracing::info;

use super::CommandError;
use crate::db::AppState;
use crate::models::TeamRpeTarget;
use crate::store::SqliteLogStore;
use crate::team::TeamReport;
use crate::team_rpe::{week_end, week_start, TeamRpeWeek};

/// Per-subject averages and the team series over logs dated `from..=to`
pub async fn get_team_report(
  state: &AppState<SqliteLogStore>,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<TeamReport, CommandError> {
  if from > to {
    return Err(CommandError::Validation(format!(
      "Invalid range: {} is after {}",
      from, to
    )));
  }
  let logs = state.store.list_logs_between(from, to).await?;
  Ok(TeamReport::from_logs(&logs))
}

/// Target and actual team RPE for the week containing `date`
pub async fn get_team_rpe_week(
  state: &AppState<SqliteLogStore>,
  date: NaiveDate,
) -> Result<TeamRpeWeek, CommandError> {
  let monday = week_start(date);
  let target = state.store.get_rpe_target(monday).await?;
  let logs = state.store.list_logs_between(monday, week_end(monday)).await?;
  Ok(TeamRpeWeek::compare(monday, target, &logs))
}

/// Save the week's targets. Any date of the week may be given as
/// `week_start`; it is stored under that week's Monday.
pub async fn set_team_rpe_target(
  state: &AppState<SqliteLogStore>,
  target: TeamRpeTarget,
) -> Result<TeamRpeTarget, CommandError> {
  for value in target.days().into_iter().flatten() {
    if !value.is_finite() || !(0.0..=10.0).contains(&value) {
      return Err(CommandError::Validation(format!(
        "Target RPE must be between 0 and 10, got {}",
        value
      )));
    }
  }

  let monday = week_start(target.week_start);
  let target = TeamRpeTarget::new(monday, target.days());
  state.store.upsert_rpe_target(&target).await?;
  info!(week_start = %monday, "Team RPE targets saved");

  state
    .store
    .get_rpe_target(monday)
    .await?
    .ok_or_else(|| CommandError::NotFound(format!("No RPE targets for week of {}", monday)))
}
