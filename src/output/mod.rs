//! Output formatting module
//!
//! Provides the output formats for run reports.

mod formatter;

pub use formatter::{OutputFormat, ReportFormatter};
