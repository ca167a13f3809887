//! Workload ratio recalculation
//!
//! Recording a session changes the acute/chronic means of every later day
//! whose trailing window contains it, so after each post-session write the
//! subject's most recent logs are re-read and every one of them gets a
//! fresh ratio. Writes are best-effort per entry with bounded retries;
//! failures are logged and reported, never rolled back.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::LogPatch;
use crate::store::{LogStore, StoreError};
use crate::workload::{samples_from_logs, workload_ratio, CHRONIC_WINDOW_DAYS};

/// Rows re-read per recalculation
pub const RECALC_WINDOW_LOGS: i64 = CHRONIC_WINDOW_DAYS;

/// ---------------------------------------------------------------------------
/// Retry Policy
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total attempts per write, including the first
  pub max_attempts: usize,
  pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      base_backoff_ms: 50,
    }
  }
}

impl RetryPolicy {
  /// Delay before retry number `attempt` (1-based), doubling each time
  fn backoff(&self, attempt: usize) -> Duration {
    let factor = 1u64 << (attempt.saturating_sub(1)).min(10);
    Duration::from_millis(self.base_backoff_ms.saturating_mul(factor))
  }
}

/// ---------------------------------------------------------------------------
/// Per-Subject Serialization
/// ---------------------------------------------------------------------------

/// One async lock per subject id, created on first use and dropped by
/// [`SubjectLocks::release`] once nobody holds or waits on it
#[derive(Debug, Default)]
pub struct SubjectLocks {
  locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SubjectLocks {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn lock_for(&self, subject_id: &str) -> Arc<Mutex<()>> {
    let mut locks = self.locks.lock().await;
    locks
      .entry(subject_id.to_string())
      .or_insert_with(|| Arc::new(Mutex::new(())))
      .clone()
  }

  /// Forget the subject's lock if the map holds the only handle to it
  pub async fn release(&self, subject_id: &str) {
    let mut locks = self.locks.lock().await;
    if locks.get(subject_id).is_some_and(|l| Arc::strong_count(l) == 1) {
      locks.remove(subject_id);
    }
  }

  /// Subjects with a live lock entry
  pub async fn tracked(&self) -> usize {
    self.locks.lock().await.len()
  }
}

/// ---------------------------------------------------------------------------
/// Report
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalcReport {
  pub subject_id: String,
  /// Logs read back from the store
  pub fetched: usize,
  /// Logs whose ratio was persisted
  pub updated: usize,
  /// Dates whose write still failed after retries
  pub failed: Vec<NaiveDate>,
}

impl RecalcReport {
  pub fn is_complete(&self) -> bool {
    self.failed.is_empty()
  }
}

/// ---------------------------------------------------------------------------
/// Recalculator
/// ---------------------------------------------------------------------------

pub struct Recalculator<S: LogStore + ?Sized> {
  store: Arc<S>,
  retry: RetryPolicy,
  locks: SubjectLocks,
}

impl<S: LogStore + ?Sized> Recalculator<S> {
  pub fn new(store: Arc<S>, retry: RetryPolicy) -> Self {
    Self {
      store,
      retry,
      locks: SubjectLocks::new(),
    }
  }

  pub fn retry_policy(&self) -> RetryPolicy {
    self.retry
  }

  /// Recompute and persist the ratio of each of the subject's most recent logs.
  ///
  /// Returns `Err` only if the logs cannot be read; per-entry write failures
  /// end up in [`RecalcReport::failed`].
  pub async fn recalculate_window(&self, subject_id: &str) -> Result<RecalcReport, StoreError> {
    let lock = self.locks.lock_for(subject_id).await;
    let result = {
      let _guard = lock.lock().await;
      self.recalculate_locked(subject_id).await
    };
    drop(lock);
    self.locks.release(subject_id).await;
    result
  }

  async fn recalculate_locked(&self, subject_id: &str) -> Result<RecalcReport, StoreError> {
    let logs = match self.store.list_recent_logs(subject_id, RECALC_WINDOW_LOGS).await {
      Ok(logs) => logs,
      Err(e) => {
        warn!(subject_id, error = %e, "Failed to fetch logs for recalculation");
        return Err(e);
      }
    };

    let samples = samples_from_logs(&logs);
    let mut report = RecalcReport {
      subject_id: subject_id.to_string(),
      fetched: logs.len(),
      updated: 0,
      failed: Vec::new(),
    };

    for log in &logs {
      let ratio = workload_ratio(&samples, log.date);
      debug!(subject_id, date = %log.date, ?ratio, "Recomputed workload ratio");

      let patch = LogPatch::ratio(subject_id, log.date, ratio);
      match self.write_with_retry(&patch).await {
        Ok(()) => report.updated += 1,
        Err(e) => {
          warn!(subject_id, date = %log.date, error = %e, "Failed to persist workload ratio");
          report.failed.push(log.date);
        }
      }
    }

    info!(
      subject_id,
      fetched = report.fetched,
      updated = report.updated,
      failed = report.failed.len(),
      "Workload recalculation finished"
    );

    Ok(report)
  }

  async fn write_with_retry(&self, patch: &LogPatch) -> Result<(), StoreError> {
    let attempts = self.retry.max_attempts.max(1);
    let mut attempt = 1;
    loop {
      match self.store.upsert_log(patch).await {
        Ok(()) => return Ok(()),
        Err(e) if attempt >= attempts => return Err(e),
        Err(e) => {
          debug!(date = %patch.date, attempt, error = %e, "Retrying ratio write");
          tokio::time::sleep(self.retry.backoff(attempt)).await;
          attempt += 1;
        }
      }
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
