//! Browser capability models
//!
//! A capability names one browser configuration and sizes its worker pool.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Supported browsers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
}

impl Browser {
    /// Get the W3C browserName value
    pub fn name(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Safari => "safari",
            Browser::Edge => "MicrosoftEdge",
        }
    }

    /// Vendor-specific options key in the capabilities payload, if any
    pub fn options_key(&self) -> Option<&'static str> {
        match self {
            Browser::Chrome => Some("goog:chromeOptions"),
            Browser::Firefox => Some("moz:firefoxOptions"),
            Browser::Edge => Some("ms:edgeOptions"),
            // Safari takes no vendor options and cannot run headless
            Browser::Safari => None,
        }
    }

    /// Check if the browser supports headless mode
    pub fn supports_headless(&self) -> bool {
        !matches!(self, Browser::Safari)
    }

    /// Get all supported browsers
    pub fn all() -> Vec<Browser> {
        vec![
            Browser::Chrome,
            Browser::Firefox,
            Browser::Safari,
            Browser::Edge,
        ]
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Browser> {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" => Some(Browser::Chrome),
            "firefox" | "gecko" => Some(Browser::Firefox),
            "safari" => Some(Browser::Safari),
            "edge" | "microsoftedge" => Some(Browser::Edge),
            _ => None,
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named browser configuration defining one worker pool.
///
/// Immutable for the duration of a run; the pool is sized from `instances`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Capability {
    /// Registry name used to select this capability (e.g. "chrome")
    pub name: String,

    /// Browser to drive
    pub browser: Browser,

    /// Number of concurrent browser sessions to open
    #[serde(default = "default_instances")]
    pub instances: usize,

    /// Run the browser headless
    #[serde(default)]
    pub headless: bool,

    /// Platform label (e.g. "mac", "linux")
    #[serde(default)]
    pub platform: Option<String>,

    /// Extra browser arguments
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_instances() -> usize {
    1
}

impl Capability {
    pub fn new(name: impl Into<String>, browser: Browser) -> Self {
        Self {
            name: name.into(),
            browser,
            instances: 1,
            headless: false,
            platform: None,
            args: Vec::new(),
        }
    }

    pub fn with_instances(mut self, instances: usize) -> Self {
        self.instances = instances;
        self
    }

    pub fn with_headless(mut self) -> Self {
        self.headless = true;
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Build the W3C `capabilities.alwaysMatch` payload for session creation
    pub fn w3c_capabilities(&self) -> Value {
        let mut caps = json!({ "browserName": self.browser.name() });

        if let Some(platform) = &self.platform {
            caps["platformName"] = json!(platform);
        }

        let mut args = self.args.clone();
        if self.headless && self.browser.supports_headless() {
            args.push("--headless".to_string());
        }

        if !args.is_empty() {
            if let Some(key) = self.browser.options_key() {
                caps[key] = json!({ "args": args });
            }
        }

        caps
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} x{})", self.name, self.browser, self.instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_from_str() {
        assert_eq!(Browser::from_str("chrome"), Some(Browser::Chrome));
        assert_eq!(Browser::from_str("FIREFOX"), Some(Browser::Firefox));
        assert_eq!(Browser::from_str("microsoftedge"), Some(Browser::Edge));
        assert_eq!(Browser::from_str("opera"), None);
    }

    #[test]
    fn test_safari_headless() {
        assert!(!Browser::Safari.supports_headless());
        assert!(Browser::Chrome.supports_headless());
    }

    #[test]
    fn test_capability_builder() {
        let cap = Capability::new("chrome-ci", Browser::Chrome)
            .with_instances(4)
            .with_headless()
            .with_platform("linux");

        assert_eq!(cap.name, "chrome-ci");
        assert_eq!(cap.instances, 4);
        assert!(cap.headless);
    }

    #[test]
    fn test_w3c_payload() {
        let cap = Capability::new("chrome", Browser::Chrome)
            .with_headless()
            .with_arg("--no-sandbox");

        let payload = cap.w3c_capabilities();
        assert_eq!(payload["browserName"], "chrome");

        let args = payload["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("--headless")));
        assert!(args.contains(&json!("--no-sandbox")));
    }

    #[test]
    fn test_w3c_payload_safari_drops_args() {
        let cap = Capability::new("safari", Browser::Safari).with_headless();
        let payload = cap.w3c_capabilities();

        assert_eq!(payload["browserName"], "safari");
        assert!(payload.get("goog:chromeOptions").is_none());
    }
}
