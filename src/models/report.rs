//! Round report models
//!
//! Owned pass/fail records produced by the reporter at the end of a round.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// A failed task recorded in failure order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskFailure {
    /// Task display name ("{suite} > {test} @ {capability}")
    pub task: String,
    /// Rendered error detail, including the context chain
    pub detail: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">>> In {}:\n{}", self.task, self.detail)
    }
}

/// Summary of one dispatch round
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Round number (0 = initial run, 1.. = retry rounds)
    pub round: u32,
    pub passed: usize,
    pub failed: usize,
    /// Failed tasks in the order their failures were reported
    pub failures: Vec<TaskFailure>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn is_all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total() as f64) * 100.0
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "round {}: {} passed, {} failed",
            self.round, self.passed, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_report_totals() {
        let report = RunReport {
            round: 0,
            passed: 3,
            failed: 1,
            failures: vec![TaskFailure {
                task: "suite > test @ chrome".to_string(),
                detail: "boom".to_string(),
            }],
        };

        assert_eq!(report.total(), 4);
        assert!(!report.is_all_passed());
        assert_eq!(report.pass_rate(), 75.0);
    }

    #[test]
    fn test_empty_report_pass_rate() {
        let report = RunReport {
            round: 0,
            passed: 0,
            failed: 0,
            failures: Vec::new(),
        };
        assert_eq!(report.pass_rate(), 0.0);
        assert!(report.is_all_passed());
    }
}
