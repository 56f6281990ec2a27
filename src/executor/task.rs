//! Task lifecycle and completion signalling
//!
//! A task wraps one async callback bound to a capability. Its completion
//! signal resolves exactly once per lifecycle and never carries an error:
//! failure is represented by state plus a captured error, so awaiting a
//! whole batch settles regardless of individual outcomes.

#![allow(dead_code)]

use futures::future::BoxFuture;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use super::Reporter;
use crate::driver::Session;

/// Async callback a task executes against a worker's session
pub type TaskCallback =
    Arc<dyn Fn(Arc<dyn Session>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Task lifecycle states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    Created,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Created => write!(f, "created"),
            TaskState::Running => write!(f, "running"),
            TaskState::Succeeded => write!(f, "succeeded"),
            TaskState::Failed => write!(f, "failed"),
        }
    }
}

/// Task lifecycle errors
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("cannot reset task '{task}' from state {from}, only failed tasks reset")]
    InvalidReset { task: String, from: TaskState },
}

struct TaskInner {
    state: TaskState,
    error: Option<anyhow::Error>,
    done: watch::Sender<bool>,
}

/// A schedulable unit of work bound to one capability
pub struct Task {
    capability: String,
    name: String,
    callback: TaskCallback,
    reporter: Arc<Reporter>,
    inner: Mutex<TaskInner>,
}

impl Task {
    pub fn new(
        capability: impl Into<String>,
        name: impl Into<String>,
        callback: TaskCallback,
        reporter: Arc<Reporter>,
    ) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            capability: capability.into(),
            name: name.into(),
            callback,
            reporter,
            inner: Mutex::new(TaskInner {
                state: TaskState::Created,
                error: None,
                done,
            }),
        }
    }

    /// Capability this task must run on
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Display name ("{suite} > {test} @ {capability}")
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TaskState {
        self.inner.lock().expect("task state lock poisoned").state
    }

    pub fn has_error(&self) -> bool {
        self.inner
            .lock()
            .expect("task state lock poisoned")
            .error
            .is_some()
    }

    /// Rendered error detail, including the context chain
    pub fn error_detail(&self) -> Option<String> {
        self.inner
            .lock()
            .expect("task state lock poisoned")
            .error
            .as_ref()
            .map(|e| format!("{e:#}"))
    }

    /// Subscribe to the current lifecycle's completion signal.
    ///
    /// The receiver observes `true` once the task reaches a terminal state,
    /// including when subscribed after completion.
    pub fn completion(&self) -> watch::Receiver<bool> {
        self.inner
            .lock()
            .expect("task state lock poisoned")
            .done
            .subscribe()
    }

    /// Wait until the current lifecycle reaches a terminal state
    pub async fn wait(&self) {
        let mut rx = self.completion();
        // The sender lives in the task, so the channel cannot close here.
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Run the callback against a worker's session.
    ///
    /// Terminal outcome is recorded on the task and reported before the
    /// completion signal resolves; callback errors never propagate.
    pub async fn run(&self, session: Arc<dyn Session>) {
        {
            let mut inner = self.inner.lock().expect("task state lock poisoned");
            inner.state = TaskState::Running;
        }
        debug!("Running task '{}'", self.name);

        let result = (self.callback)(session).await;

        let succeeded = result.is_ok();
        {
            let mut inner = self.inner.lock().expect("task state lock poisoned");
            match result {
                Ok(()) => inner.state = TaskState::Succeeded,
                Err(err) => {
                    inner.error = Some(err);
                    inner.state = TaskState::Failed;
                }
            }
        }

        if succeeded {
            self.reporter.report_success();
        } else {
            self.reporter.report_failure();
            self.reporter.save_errored_task(self);
        }

        self.inner
            .lock()
            .expect("task state lock poisoned")
            .done
            .send_replace(true);
    }

    /// Prepare a failed task for a retry round.
    ///
    /// Clears the captured error and installs a fresh, unresolved completion
    /// signal. Valid only from the failed state.
    pub fn reset(&self) -> Result<(), TaskError> {
        let mut inner = self.inner.lock().expect("task state lock poisoned");
        if inner.state != TaskState::Failed {
            return Err(TaskError::InvalidReset {
                task: self.name.clone(),
                from: inner.state,
            });
        }

        let (done, _) = watch::channel(false);
        inner.error = None;
        inner.done = done;
        inner.state = TaskState::Created;
        Ok(())
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("capability", &self.capability)
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::FakeSession;

    fn session() -> Arc<dyn Session> {
        Arc::new(FakeSession::new("test-session"))
    }

    fn passing_task(reporter: &Arc<Reporter>) -> Task {
        Task::new(
            "chrome",
            "suite > passes @ chrome",
            Arc::new(|_| Box::pin(async { Ok(()) })),
            Arc::clone(reporter),
        )
    }

    fn failing_task(reporter: &Arc<Reporter>) -> Task {
        Task::new(
            "chrome",
            "suite > fails @ chrome",
            Arc::new(|_| Box::pin(async { Err(anyhow::anyhow!("boom")) })),
            Arc::clone(reporter),
        )
    }

    #[tokio::test]
    async fn test_success_reaches_terminal_state() {
        let reporter = Arc::new(Reporter::new());
        let task = passing_task(&reporter);

        assert_eq!(task.state(), TaskState::Created);
        task.run(session()).await;

        assert_eq!(task.state(), TaskState::Succeeded);
        assert!(!task.has_error());
        assert_eq!(reporter.success_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_captures_error_and_resolves() {
        let reporter = Arc::new(Reporter::new());
        let task = failing_task(&reporter);

        task.run(session()).await;

        assert_eq!(task.state(), TaskState::Failed);
        assert_eq!(task.error_detail().unwrap(), "boom");
        assert_eq!(reporter.failure_count(), 1);

        // The signal resolves rather than rejecting on failure.
        assert!(*task.completion().borrow());
    }

    #[tokio::test]
    async fn test_completion_resolves_for_late_subscriber() {
        let reporter = Arc::new(Reporter::new());
        let task = passing_task(&reporter);

        task.run(session()).await;
        // Subscribed only after the task finished.
        task.wait().await;
    }

    #[tokio::test]
    async fn test_reset_clears_error_and_signal() {
        let reporter = Arc::new(Reporter::new());
        let task = failing_task(&reporter);

        task.run(session()).await;
        assert!(*task.completion().borrow());

        task.reset().unwrap();

        assert_eq!(task.state(), TaskState::Created);
        assert!(!task.has_error());
        assert!(!*task.completion().borrow());
    }

    #[tokio::test]
    async fn test_reset_rejected_unless_failed() {
        let reporter = Arc::new(Reporter::new());

        let created = passing_task(&reporter);
        assert!(matches!(
            created.reset(),
            Err(TaskError::InvalidReset {
                from: TaskState::Created,
                ..
            })
        ));

        let succeeded = passing_task(&reporter);
        succeeded.run(session()).await;
        assert!(matches!(
            succeeded.reset(),
            Err(TaskError::InvalidReset {
                from: TaskState::Succeeded,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_failed_task_can_rerun_after_reset() {
        let reporter = Arc::new(Reporter::new());
        let task = failing_task(&reporter);

        task.run(session()).await;
        task.reset().unwrap();
        task.run(session()).await;

        assert_eq!(task.state(), TaskState::Failed);
        assert_eq!(reporter.failure_count(), 2);
    }
}
