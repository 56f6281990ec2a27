//! Test-definition layer
//!
//! Compiles declarative spec files into schedulable tasks, one per test
//! unit per capability. The whole unit, including before/after steps, runs
//! under the suite timeout; a timeout is an ordinary task failure.

#![allow(dead_code)]

mod spec;

pub use spec::{discover_specs, SpecStep, TestSpec, TestUnit};

use anyhow::{bail, Context};
use std::sync::Arc;
use std::time::Duration;

use crate::executor::{Reporter, Task, TaskCallback};

impl TestSpec {
    /// Compile every test in the suite into tasks for one capability.
    ///
    /// Task display names follow `"{suite} > {test} @ {capability}"`.
    pub fn into_tasks(&self, capability: &str, reporter: &Arc<Reporter>) -> Vec<Arc<Task>> {
        let before: Arc<[SpecStep]> = self.before_each.clone().into();
        let after: Arc<[SpecStep]> = self.after_each.clone().into();

        self.tests
            .iter()
            .map(|test| {
                let name = format!("{} > {} @ {}", self.suite, test.name, capability);
                let callback = unit_callback(
                    Arc::clone(&before),
                    test.steps.clone().into(),
                    Arc::clone(&after),
                    self.timeout_ms,
                );
                Arc::new(Task::new(capability, name, callback, Arc::clone(reporter)))
            })
            .collect()
    }
}

fn unit_callback(
    before: Arc<[SpecStep]>,
    steps: Arc<[SpecStep]>,
    after: Arc<[SpecStep]>,
    timeout_ms: u64,
) -> TaskCallback {
    Arc::new(move |session| {
        let before = Arc::clone(&before);
        let steps = Arc::clone(&steps);
        let after = Arc::clone(&after);

        Box::pin(async move {
            let unit = async {
                for step in before.iter() {
                    step.run(&*session).await.context("<before_each>")?;
                }
                for step in steps.iter() {
                    step.run(&*session).await?;
                }
                for step in after.iter() {
                    step.run(&*session).await.context("<after_each>")?;
                }
                Ok(())
            };

            match tokio::time::timeout(Duration::from_millis(timeout_ms), unit).await {
                Ok(result) => result,
                Err(_) => bail!("timeout of {timeout_ms}ms reached"),
            }
        })
    })
}
