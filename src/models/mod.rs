//! Data models for the test runner
//!
//! This module contains the data structures shared across the application.

mod capability;
mod report;

pub use capability::{Browser, Capability};
pub use report::{RunReport, TaskFailure};
