pub mod sessions;
pub mod team;

use serde::Serialize;

use crate::store::StoreError;

pub use sessions::{
  get_daily_log, get_pain_report, get_workload_history, record_post_session, record_pre_session,
  PostSessionOutcome,
};
pub use team::{get_team_report, get_team_rpe_week, set_team_rpe_target};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
  #[error("Invalid input: {0}")]
  Validation(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error(transparent)]
  Store(#[from] StoreError),
}

/// Callers receive the display string, not the error structure
impl Serialize for CommandError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_serializes_as_message() {
    let err = CommandError::Validation("duration_minutes is required".to_string());
    let json = serde_json::to_string(&err).unwrap();
    assert_eq!(json, "\"Invalid input: duration_minutes is required\"");
  }

  #[test]
  fn test_store_error_converts() {
    let err: CommandError = StoreError::Unavailable("down".to_string()).into();
    assert_eq!(err.to_string(), "Store unavailable: down");
  }
}
