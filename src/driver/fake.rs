//! In-memory driver and session fakes for tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{Driver, DriverError, Session};
use crate::models::Capability;

/// Session factory producing scriptable in-memory sessions.
///
/// Sessions are named `session-0`, `session-1`, ... in creation order.
#[derive(Default)]
pub struct FakeDriver {
    counter: AtomicUsize,
    quit_log: Arc<Mutex<Vec<String>>>,
    fail_quit_on: Mutex<HashSet<usize>>,
    fail_session_on: Mutex<HashSet<usize>>,
    title: Mutex<String>,
    eval_result: Mutex<Value>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
            quit_log: Arc::new(Mutex::new(Vec::new())),
            fail_quit_on: Mutex::new(HashSet::new()),
            fail_session_on: Mutex::new(HashSet::new()),
            title: Mutex::new(String::new()),
            eval_result: Mutex::new(Value::Null),
        }
    }

    /// Make the nth created session fail its quit call
    pub fn fail_quit_on(self, index: usize) -> Self {
        self.fail_quit_on.lock().unwrap().insert(index);
        self
    }

    /// Make the nth session creation fail outright
    pub fn fail_session_on(self, index: usize) -> Self {
        self.fail_session_on.lock().unwrap().insert(index);
        self
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        *self.title.lock().unwrap() = title.into();
        self
    }

    pub fn with_eval_result(self, value: Value) -> Self {
        *self.eval_result.lock().unwrap() = value;
        self
    }

    pub fn sessions_created(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    /// Session ids that received a quit call, in call order
    pub fn quit_log(&self) -> Vec<String> {
        self.quit_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn new_session(&self, capability: &Capability) -> Result<Arc<dyn Session>, DriverError> {
        let index = self.counter.fetch_add(1, Ordering::SeqCst);
        if self.fail_session_on.lock().unwrap().contains(&index) {
            return Err(DriverError::SessionCreate {
                capability: capability.name.clone(),
                message: "session refused".to_string(),
            });
        }
        let fail_quit = self.fail_quit_on.lock().unwrap().contains(&index);

        Ok(Arc::new(FakeSession {
            id: format!("session-{index}"),
            title: self.title.lock().unwrap().clone(),
            eval_result: self.eval_result.lock().unwrap().clone(),
            url: Mutex::new("about:blank".to_string()),
            quit_log: Arc::clone(&self.quit_log),
            fail_quit,
        }))
    }
}

/// A session whose commands answer from fixed values
pub struct FakeSession {
    id: String,
    title: String,
    eval_result: Value,
    url: Mutex<String>,
    quit_log: Arc<Mutex<Vec<String>>>,
    fail_quit: bool,
}

impl FakeSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            eval_result: Value::Null,
            url: Mutex::new("about:blank".to_string()),
            quit_log: Arc::new(Mutex::new(Vec::new())),
            fail_quit: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_eval_result(mut self, value: Value) -> Self {
        self.eval_result = value;
        self
    }
}

#[async_trait]
impl Session for FakeSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn title(&self) -> Result<String, DriverError> {
        Ok(self.title.clone())
    }

    async fn execute(&self, _script: &str, _args: Vec<Value>) -> Result<Value, DriverError> {
        Ok(self.eval_result.clone())
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.quit_log.lock().unwrap().push(self.id.clone());
        if self.fail_quit {
            return Err(DriverError::Command {
                command: "DELETE /session".to_string(),
                error: "unknown error".to_string(),
                message: "session already gone".to_string(),
            });
        }
        Ok(())
    }
}
