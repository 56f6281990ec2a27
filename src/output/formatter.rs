//! Output formatters for run reports
//!
//! Provides text, JSON, and summary output formats.

#![allow(dead_code)]

use serde::Serialize;

use crate::executor::RetryOutcome;
use crate::models::RunReport;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Report formatter
pub struct ReportFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format one round's report
    pub fn format_report(&self, report: &RunReport) -> String {
        match self.format {
            OutputFormat::Text => self.format_report_text(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Summary => self.format_report_brief(report),
        }
    }

    fn format_report_text(&self, report: &RunReport) -> String {
        let mut output = String::new();

        output.push_str("\n==============================\n");

        let passed = format!("{} passed", report.passed);
        if self.colorize {
            output.push_str(&format!("\x1b[32m{passed}\x1b[0m\n"));
        } else {
            output.push_str(&passed);
            output.push('\n');
        }

        if report.failed != 0 {
            let failed = format!("{} failed", report.failed);
            if self.colorize {
                output.push_str(&format!("\x1b[31m{failed}\x1b[0m\n"));
            } else {
                output.push_str(&failed);
                output.push('\n');
            }
        }

        output.push_str("==============================\n");

        for failure in &report.failures {
            if self.colorize {
                output.push_str(&format!(
                    "\x1b[31m>>> In {}:\n{}\x1b[0m\n",
                    failure.task, failure.detail
                ));
            } else {
                output.push_str(&format!(">>> In {}:\n{}\n", failure.task, failure.detail));
            }
        }

        output
    }

    fn format_report_brief(&self, report: &RunReport) -> String {
        format!(
            "round {}: {}/{} passed ({:.1}%)",
            report.round,
            report.passed,
            report.total(),
            report.pass_rate()
        )
    }

    /// Format the overall run outcome
    pub fn format_outcome(&self, outcome: &RetryOutcome) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => {
                #[derive(Serialize)]
                struct OutcomeJson<'a> {
                    converged: bool,
                    rounds: &'a [RunReport],
                    duration_ms: i64,
                }

                let json = OutcomeJson {
                    converged: outcome.converged,
                    rounds: &outcome.rounds,
                    duration_ms: outcome.duration().num_milliseconds(),
                };

                if self.format == OutputFormat::JsonPretty {
                    serde_json::to_string_pretty(&json).unwrap_or_default()
                } else {
                    serde_json::to_string(&json).unwrap_or_default()
                }
            }
            _ => self.format_outcome_text(outcome),
        }
    }

    fn format_outcome_text(&self, outcome: &RetryOutcome) -> String {
        let verdict = if outcome.converged {
            if self.colorize {
                "\x1b[32mOK\x1b[0m".to_string()
            } else {
                "OK".to_string()
            }
        } else if self.colorize {
            "\x1b[31mFAILED\x1b[0m".to_string()
        } else {
            "FAILED".to_string()
        };

        format!(
            "{} after {} round(s) in {}ms",
            verdict,
            outcome.total_rounds(),
            outcome.duration().num_milliseconds()
        )
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}
