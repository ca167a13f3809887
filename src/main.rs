use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wellness_load::{initialize_state, EngineConfig};

#[tokio::main]
async fn main() -> ExitCode {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = match EngineConfig::from_env() {
    Ok(config) => config,
    Err(e) => {
      eprintln!("Configuration error: {}", e);
      return ExitCode::from(2);
    }
  };

  tracing_subscriber::registry()
    .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let Some(subject_id) = std::env::args().nth(1) else {
    eprintln!("usage: wellness-recalc <subject-id>");
    return ExitCode::from(2);
  };

  let state = match initialize_state(&config).await {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialize database");
      return ExitCode::FAILURE;
    }
  };

  let report = match state.recalculator.recalculate_window(&subject_id).await {
    Ok(report) => report,
    Err(e) => {
      tracing::error!(subject_id = %subject_id, error = %e, "Recalculation failed");
      return ExitCode::FAILURE;
    }
  };

  match serde_json::to_string_pretty(&report) {
    Ok(json) => println!("{}", json),
    Err(e) => tracing::error!(error = %e, "Failed to serialize report"),
  }

  if report.is_complete() {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  }
}
