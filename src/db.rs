use std::sync::Arc;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::config::EngineConfig;
use crate::recalc::{Recalculator, RetryPolicy};
use crate::store::{LogStore, SqliteLogStore, StoreError};

pub type DbPool = SqlitePool;

/// Application state: the log store and the recalculator writing to it
pub struct AppState<S: LogStore = SqliteLogStore> {
  pub store: Arc<S>,
  pub recalculator: Recalculator<S>,
}

impl<S: LogStore> AppState<S> {
  pub fn new(store: Arc<S>, retry: RetryPolicy) -> Self {
    Self {
      recalculator: Recalculator::new(store.clone(), retry),
      store,
    }
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &EngineConfig) -> Result<DbPool, StoreError> {
  info!(url = %config.database_url, "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .connect(&config.database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}

/// Connect, migrate and wire the SQLite store into application state
pub async fn initialize_state(config: &EngineConfig) -> Result<AppState, StoreError> {
  let pool = initialize_db(config).await?;
  Ok(AppState::new(Arc::new(SqliteLogStore::new(pool)), config.retry))
}
