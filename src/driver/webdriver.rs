//! W3C WebDriver protocol client
//!
//! Drives browser sessions over HTTP against a WebDriver server
//! (chromedriver, geckodriver, or a Selenium Grid hub).

#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{Driver, DriverError, Session};
use crate::models::Capability;

/// WebDriver server client, a session factory
#[derive(Clone)]
pub struct WebDriverClient {
    client: Client,
    base_url: String,
}

impl WebDriverClient {
    /// Create a client for the given server URL
    pub fn new(base_url: impl Into<String>) -> Result<Self, DriverError> {
        Self::with_timeout(base_url, 120)
    }

    /// Create a client with a custom request timeout.
    ///
    /// The timeout bounds individual protocol requests, not task execution.
    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, DriverError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Driver for WebDriverClient {
    async fn new_session(&self, capability: &Capability) -> Result<Arc<dyn Session>, DriverError> {
        let body = json!({
            "capabilities": {
                "alwaysMatch": capability.w3c_capabilities(),
            }
        });

        debug!("Creating {} session at {}", capability.name, self.base_url);

        let response = self
            .client
            .post(format!("{}/session", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let value: Value = response.json().await?;

        if !status.is_success() {
            return Err(DriverError::SessionCreate {
                capability: capability.name.clone(),
                message: wire_error_message(&value),
            });
        }

        let session_id = value["value"]["sessionId"]
            .as_str()
            .ok_or_else(|| {
                DriverError::InvalidResponse("session response missing sessionId".to_string())
            })?
            .to_string();

        debug!("Session {} created for {}", session_id, capability.name);

        Ok(Arc::new(WebDriverSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            session_id,
        }))
    }
}

/// One live browser session on the server
pub struct WebDriverSession {
    client: Client,
    base_url: String,
    session_id: String,
}

impl WebDriverSession {
    /// Issue a session-scoped command and return the unwrapped `value`
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, DriverError> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let value: Value = response.json().await?;

        if !status.is_success() {
            return Err(DriverError::Command {
                command: format!("{method} {path}"),
                error: value["value"]["error"]
                    .as_str()
                    .unwrap_or("unknown error")
                    .to_string(),
                message: wire_error_message(&value),
            });
        }

        Ok(value["value"].clone())
    }
}

#[async_trait]
impl Session for WebDriverSession {
    fn id(&self) -> &str {
        &self.session_id
    }

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let value = self.command(Method::GET, "/url", None).await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| DriverError::InvalidResponse("url is not a string".to_string()))
    }

    async fn title(&self) -> Result<String, DriverError> {
        let value = self.command(Method::GET, "/title", None).await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| DriverError::InvalidResponse("title is not a string".to_string()))
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn quit(&self) -> Result<(), DriverError> {
        debug!("Quitting session {}", self.session_id);
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        let response = self.client.delete(&url).send().await?;

        if !response.status().is_success() {
            let value: Value = response.json().await.unwrap_or(Value::Null);
            return Err(DriverError::Command {
                command: "DELETE /session".to_string(),
                error: value["value"]["error"]
                    .as_str()
                    .unwrap_or("unknown error")
                    .to_string(),
                message: wire_error_message(&value),
            });
        }

        Ok(())
    }
}

/// Extract the message from a W3C error payload (`{"value": {"error", "message"}}`)
fn wire_error_message(value: &Value) -> String {
    value["value"]["message"]
        .as_str()
        .unwrap_or("no message in response")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = WebDriverClient::new("http://localhost:4444/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:4444");
    }

    #[test]
    fn test_wire_error_message() {
        let payload = json!({
            "value": { "error": "no such window", "message": "window was closed" }
        });
        assert_eq!(wire_error_message(&payload), "window was closed");
        assert_eq!(wire_error_message(&Value::Null), "no message in response");
    }
}
