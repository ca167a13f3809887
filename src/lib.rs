//! Athlete wellness log engine.
//!
//! Turns daily post-session entries into a session load (duration × RPE),
//! keeps a rolling acute:chronic workload ratio per log and classifies it
//! into a risk band.

pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod pain;
pub mod recalc;
pub mod store;
pub mod team;
pub mod team_rpe;
pub mod workload;

#[cfg(test)]
mod test_utils;

pub use config::{ConfigError, EngineConfig};
pub use db::{initialize_db, initialize_state, AppState};
pub use models::{DailyLog, LogPatch, TeamRpeTarget};
pub use recalc::{RecalcReport, Recalculator, RetryPolicy};
pub use store::{LogStore, SqliteLogStore, StoreError};
pub use workload::{session_load, workload_ratio, RiskLevel, WindowSample};
