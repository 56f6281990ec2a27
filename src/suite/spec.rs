//! Declarative test spec files
//!
//! A spec file is one YAML document: a suite of named tests, each a list of
//! steps, with optional before/after step lists and a per-suite timeout.

#![allow(dead_code)]

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ConfigError;
use crate::driver::Session;

/// A parsed spec file: one suite of tests
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestSpec {
    /// Suite name, the first half of every task's display name
    pub suite: String,

    /// Per-test timeout covering before/test/after steps together
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Steps run before every test in the suite
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub before_each: Vec<SpecStep>,

    /// Steps run after every test in the suite
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub after_each: Vec<SpecStep>,

    /// Named tests, each compiled into one task per capability
    pub tests: Vec<TestUnit>,
}

fn default_timeout_ms() -> u64 {
    30_000
}

/// One named test: an ordered list of steps
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestUnit {
    pub name: String,
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<SpecStep>,
}

/// A single browser-facing step.
///
/// Serialized as a one-key map (`- goto: https://...`), not a YAML tag.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecStep {
    /// Navigate to a URL
    Goto(String),
    /// Assert the page title contains a substring
    AssertTitleContains(String),
    /// Assert the current URL contains a substring
    AssertUrlContains(String),
    /// Run a script, discarding its value
    Eval(String),
    /// Run a script and assert it yields `true`
    AssertEvalTrue(String),
    /// Pause for a number of milliseconds
    SleepMs(u64),
}

impl SpecStep {
    /// Execute one step against a session
    pub async fn run(&self, session: &dyn Session) -> Result<()> {
        match self {
            SpecStep::Goto(url) => {
                session.goto(url).await.context("goto failed")?;
            }
            SpecStep::AssertTitleContains(needle) => {
                let title = session.title().await.context("reading title failed")?;
                if !title.contains(needle.as_str()) {
                    bail!("expected title containing '{needle}', got '{title}'");
                }
            }
            SpecStep::AssertUrlContains(needle) => {
                let url = session.current_url().await.context("reading url failed")?;
                if !url.contains(needle.as_str()) {
                    bail!("expected url containing '{needle}', got '{url}'");
                }
            }
            SpecStep::Eval(script) => {
                session
                    .execute(script, Vec::new())
                    .await
                    .context("script failed")?;
            }
            SpecStep::AssertEvalTrue(script) => {
                let value = session
                    .execute(script, Vec::new())
                    .await
                    .context("script failed")?;
                if value != serde_json::Value::Bool(true) {
                    bail!("expected script to yield true, got {value}");
                }
            }
            SpecStep::SleepMs(ms) => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
        }
        Ok(())
    }
}

impl TestSpec {
    /// Load a spec from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Recursively collect `.yaml`/`.yml` files under a directory, sorted
pub fn discover_specs(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ConfigError> {
    let dir = dir.as_ref();
    let mut found = Vec::new();
    if dir.is_dir() {
        walk(dir, &mut found)?;
    }
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), ConfigError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, found)?;
        } else if path
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false)
        {
            found.push(path);
        }
    }
    Ok(())
}
