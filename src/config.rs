use std::env;

use crate::recalc::RetryPolicy;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_DATABASE_URL: &str = "sqlite://wellness.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value:?}")]
  Invalid { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
  pub database_url: String,
  pub max_connections: u32,
  pub retry: RetryPolicy,
  /// tracing-subscriber filter directive
  pub log_filter: String,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      max_connections: DEFAULT_MAX_CONNECTIONS,
      retry: RetryPolicy::default(),
      log_filter: DEFAULT_LOG_FILTER.to_string(),
    }
  }
}

impl EngineConfig {
  /// Read `WELLNESS_*` variables, falling back to defaults for unset ones.
  /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let max_attempts: usize = parse_var("WELLNESS_RECALC_MAX_ATTEMPTS", defaults.retry.max_attempts)?;
    if max_attempts == 0 {
      return Err(ConfigError::Invalid {
        key: "WELLNESS_RECALC_MAX_ATTEMPTS".into(),
        value: "0".into(),
      });
    }

    let max_connections: u32 = parse_var("WELLNESS_DB_MAX_CONNECTIONS", defaults.max_connections)?;
    if max_connections == 0 {
      return Err(ConfigError::Invalid {
        key: "WELLNESS_DB_MAX_CONNECTIONS".into(),
        value: "0".into(),
      });
    }

    Ok(Self {
      database_url: env::var("WELLNESS_DATABASE_URL").unwrap_or(defaults.database_url),
      max_connections,
      retry: RetryPolicy {
        max_attempts,
        base_backoff_ms: parse_var("WELLNESS_RECALC_BACKOFF_MS", defaults.retry.base_backoff_ms)?,
      },
      log_filter: env::var("WELLNESS_LOG").unwrap_or(defaults.log_filter),
    })
  }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
  match env::var(key) {
    Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
      key: key.to_string(),
      value: raw,
    }),
    Err(env::VarError::NotPresent) => Ok(default),
    Err(env::VarError::NotUnicode(raw)) => Err(ConfigError::Invalid {
      key: key.to_string(),
      value: raw.to_string_lossy().into_owned(),
    }),
  }
}
