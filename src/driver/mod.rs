//! Execution-handle layer
//!
//! Traits for browser session factories and the sessions workers hand to
//! task callbacks, plus the W3C WebDriver implementation.

#![allow(dead_code)]

mod webdriver;

#[cfg(test)]
pub mod fake;

pub use webdriver::{WebDriverClient, WebDriverSession};

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::models::Capability;

/// Driver layer errors
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("webdriver transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to create session for '{capability}': {message}")]
    SessionCreate { capability: String, message: String },

    #[error("webdriver command {command} failed: {error}: {message}")]
    Command {
        command: String,
        error: String,
        message: String,
    },

    #[error("malformed webdriver response: {0}")]
    InvalidResponse(String),
}

/// Factory for browser sessions, one per worker
#[async_trait]
pub trait Driver: Send + Sync {
    /// Open a new session configured from the given capability
    async fn new_session(&self, capability: &Capability) -> Result<Arc<dyn Session>, DriverError>;
}

/// A live browser session, the execution handle passed to task callbacks.
///
/// Held by exactly one worker; `quit` is issued once during pool cleanup.
#[async_trait]
pub trait Session: Send + Sync {
    /// Session id assigned by the server
    fn id(&self) -> &str;

    /// Navigate to a URL
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    /// Get the current URL
    async fn current_url(&self) -> Result<String, DriverError>;

    /// Get the page title
    async fn title(&self) -> Result<String, DriverError>;

    /// Execute a synchronous script and return its value
    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError>;

    /// End the session (best-effort)
    async fn quit(&self) -> Result<(), DriverError>;
}
