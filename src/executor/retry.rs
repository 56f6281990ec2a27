//! Bounded retry orchestration
//!
//! Dispatches every task once, then re-runs only the failed subset for as
//! long as the retry budget allows. Tasks that succeed in any round are
//! never re-run within the same invocation.

#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use super::{BrowserPool, Reporter, Task};
use crate::models::RunReport;
use crate::utils::Timer;

/// Result of a full run: every round's report plus the convergence flag
#[derive(Clone, Debug)]
pub struct RetryOutcome {
    pub rounds: Vec<RunReport>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// True iff the last round finished with zero failures
    pub converged: bool,
}

impl RetryOutcome {
    pub fn total_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Report of the last executed round
    pub fn final_round(&self) -> Option<&RunReport> {
        self.rounds.last()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }
}

/// Drives rounds of dispatch-and-await until convergence or budget exhaustion
pub struct RetryRunner {
    pool: Arc<BrowserPool>,
    reporter: Arc<Reporter>,
    retries: u32,
}

impl RetryRunner {
    pub fn new(pool: Arc<BrowserPool>, reporter: Arc<Reporter>, retries: u32) -> Self {
        Self {
            pool,
            reporter,
            retries,
        }
    }

    /// Run the whole batch to convergence or until the retry budget runs out
    pub async fn run(&self, tasks: Vec<Arc<Task>>) -> Result<RetryOutcome> {
        let started_at = Utc::now();
        let mut rounds = Vec::new();

        info!("Running {} task(s)", tasks.len());
        self.run_round(&tasks, 0, &mut rounds).await?;

        let mut converged = !self.reporter.has_failures();
        let mut remaining = self.retries;
        let mut failing: Vec<Arc<Task>> = tasks.iter().filter(|t| t.has_error()).cloned().collect();

        while !converged && remaining > 0 && !failing.is_empty() {
            warn!(
                "Retrying {} failed task(s), {} retr{} remaining",
                failing.len(),
                remaining,
                if remaining == 1 { "y" } else { "ies" }
            );

            for task in &failing {
                task.reset()?;
            }
            self.reporter.reset();

            let round = rounds.len() as u32;
            self.run_round(&failing, round, &mut rounds).await?;

            if self.reporter.has_failures() {
                remaining -= 1;
                failing.retain(|t| t.has_error());
            } else {
                converged = true;
            }
        }

        if !converged {
            warn!("Still failures after {} retr{}", self.retries, if self.retries == 1 { "y" } else { "ies" });
        }

        Ok(RetryOutcome {
            rounds,
            started_at,
            completed_at: Utc::now(),
            converged,
        })
    }

    /// Dispatch the given tasks and await every completion signal.
    ///
    /// The await settles regardless of individual task outcomes; failures
    /// only show up in the reporter and on the tasks themselves.
    async fn run_round(
        &self,
        tasks: &[Arc<Task>],
        round: u32,
        rounds: &mut Vec<RunReport>,
    ) -> Result<()> {
        let timer = Timer::start(format!("round {round}"));

        for task in tasks {
            self.pool.dispatch(Arc::clone(task)).await?;
        }
        join_all(tasks.iter().map(|t| t.wait())).await;

        let mut report = self.reporter.final_report();
        report.round = round;
        info!(
            "Round {} finished in {}ms: {} passed, {} failed",
            round,
            timer.elapsed_ms(),
            report.passed,
            report.failed
        );
        rounds.push(report);
        Ok(())
    }
}
