//! Test execution engine
//!
//! Worker pools, the task lifecycle, round reporting, and the bounded
//! retry loop that drives them.

mod pool;
mod reporter;
mod retry;
mod task;

pub use pool::{BrowserPool, PoolError, PoolStats, Worker};
pub use reporter::Reporter;
pub use retry::{RetryOutcome, RetryRunner};
pub use task::{Task, TaskCallback, TaskError, TaskState};
