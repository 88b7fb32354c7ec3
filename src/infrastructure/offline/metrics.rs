use serde::Serialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReplayMetricsSnapshot {
    pub total_success: u64,
    pub total_failure: u64,
    pub consecutive_failure: u64,
    pub drains: u64,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
    pub last_outcome: Option<ApplyOutcome>,
    pub last_operation_id: Option<String>,
    pub last_target: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Default, Clone)]
struct LastApply {
    outcome: Option<ApplyOutcome>,
    operation_id: Option<String>,
    target: Option<String>,
    error: Option<String>,
}

/// Counters for the replay engine. One instance per engine.
pub struct ReplayMetrics {
    success: AtomicU64,
    failure: AtomicU64,
    consecutive_failure: AtomicU64,
    drains: AtomicU64,
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
    last: Mutex<LastApply>,
}

impl ReplayMetrics {
    pub fn new() -> Self {
        Self {
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            consecutive_failure: AtomicU64::new(0),
            drains: AtomicU64::new(0),
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            last: Mutex::new(LastApply::default()),
        }
    }

    pub fn record_success(&self, operation_id: &str, target: &str) {
        self.success.fetch_add(1, Ordering::Relaxed);
        self.last_success_ms
            .store(current_unix_ms(), Ordering::Relaxed);
        self.consecutive_failure.store(0, Ordering::Relaxed);
        self.remember(ApplyOutcome::Success, operation_id, target, None);
    }

    pub fn record_failure(&self, operation_id: &str, target: &str, reason: &str) {
        self.failure.fetch_add(1, Ordering::Relaxed);
        self.last_failure_ms
            .store(current_unix_ms(), Ordering::Relaxed);
        self.consecutive_failure.fetch_add(1, Ordering::Relaxed);
        self.remember(
            ApplyOutcome::Failure,
            operation_id,
            target,
            Some(reason.to_string()),
        );
    }

    pub fn record_drain(&self) {
        self.drains.fetch_add(1, Ordering::Relaxed);
    }

    fn remember(
        &self,
        outcome: ApplyOutcome,
        operation_id: &str,
        target: &str,
        error: Option<String>,
    ) {
        if let Ok(mut guard) = self.last.lock() {
            guard.outcome = Some(outcome);
            guard.operation_id = Some(operation_id.to_string());
            guard.target = Some(target.to_string());
            guard.error = error;
        }
    }

    pub fn snapshot(&self) -> ReplayMetricsSnapshot {
        let last = self
            .last
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();

        ReplayMetricsSnapshot {
            total_success: self.success.load(Ordering::Relaxed),
            total_failure: self.failure.load(Ordering::Relaxed),
            consecutive_failure: self.consecutive_failure.load(Ordering::Relaxed),
            drains: self.drains.load(Ordering::Relaxed),
            last_success_ms: to_option(self.last_success_ms.load(Ordering::Relaxed)),
            last_failure_ms: to_option(self.last_failure_ms.load(Ordering::Relaxed)),
            last_outcome: last.outcome,
            last_operation_id: last.operation_id,
            last_target: last.target,
            last_error: last.error,
        }
    }
}

impl Default for ReplayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn to_option(value: u64) -> Option<u64> {
    if value == 0 { None } else { Some(value) }
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}
