//! Round outcome aggregation
//!
//! Counts successes and failures and records failed tasks in failure order.
//! Reset between retry rounds; never mutates the tasks it records.

#![allow(dead_code)]

use std::sync::Mutex;
use tracing::debug;

use super::Task;
use crate::models::{RunReport, TaskFailure};

#[derive(Default)]
struct ReporterInner {
    successes: usize,
    failures: usize,
    errored: Vec<TaskFailure>,
}

/// Aggregator of round outcomes and failed-task diagnostics
#[derive(Default)]
pub struct Reporter {
    inner: Mutex<ReporterInner>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_success(&self) {
        let mut inner = self.inner.lock().expect("reporter lock poisoned");
        inner.successes += 1;
    }

    /// Always paired with `save_errored_task` when a task fails
    pub fn report_failure(&self) {
        let mut inner = self.inner.lock().expect("reporter lock poisoned");
        inner.failures += 1;
    }

    /// Record a failed task's name and error detail, in failure order
    pub fn save_errored_task(&self, task: &Task) {
        let failure = TaskFailure {
            task: task.name().to_string(),
            detail: task
                .error_detail()
                .unwrap_or_else(|| "no error captured".to_string()),
        };
        debug!("Recording failure of '{}'", failure.task);

        let mut inner = self.inner.lock().expect("reporter lock poisoned");
        inner.errored.push(failure);
    }

    /// Clear counts and the failure list for a new round
    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect("reporter lock poisoned");
        inner.successes = 0;
        inner.failures = 0;
        inner.errored.clear();
    }

    pub fn success_count(&self) -> usize {
        self.inner.lock().expect("reporter lock poisoned").successes
    }

    pub fn failure_count(&self) -> usize {
        self.inner.lock().expect("reporter lock poisoned").failures
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Snapshot the current round's outcome
    pub fn final_report(&self) -> RunReport {
        let inner = self.inner.lock().expect("reporter lock poisoned");
        RunReport {
            round: 0,
            passed: inner.successes,
            failed: inner.failures,
            failures: inner.errored.clone(),
        }
    }
}
