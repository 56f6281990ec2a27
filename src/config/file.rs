//! Configuration file management
//!
//! Handles finding, loading, and validating configuration files.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{CapabilityRegistry, ConfigError};
use crate::models::{Browser, Capability};

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./gridrunner.yaml",
    "./gridrunner.yml",
    "./.gridrunner.yaml",
    "./.gridrunner/config.yaml",
    "~/.config/gridrunner/config.yaml",
    "~/.gridrunner.yaml",
];

/// Full configuration file structure
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    /// WebDriver server URL sessions are created against
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Retry budget: how many extra rounds failed tasks get
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Default per-test timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Directory searched for spec files when none are given explicitly
    #[serde(default = "default_spec_dir")]
    pub spec_dir: PathBuf,

    /// Registered capabilities
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_retries() -> u32 {
    2
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_spec_dir() -> PathBuf {
    PathBuf::from("./spec")
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            webdriver_url: default_webdriver_url(),
            retries: default_retries(),
            timeout_ms: default_timeout_ms(),
            spec_dir: default_spec_dir(),
            capabilities: vec![Capability::new("chrome", Browser::Chrome).with_headless()],
        }
    }
}

impl ConfigFile {
    /// Create a new config file with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        for location in CONFIG_LOCATIONS {
            let path = expand_path(location);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Load configuration from the default location, or built-in defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::find() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).map_err(|e| ConfigError::InvalidValue(e.to_string()))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !["1.0"].contains(&self.version.as_str()) {
            return Err(ConfigError::InvalidValue(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        for capability in &self.capabilities {
            if capability.instances == 0 {
                return Err(ConfigError::InvalidValue(format!(
                    "capability '{}' must have at least one instance",
                    capability.name
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for capability in &self.capabilities {
            if !seen.insert(capability.name.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "capability '{}' is registered twice",
                    capability.name
                )));
            }
        }

        Ok(())
    }

    /// Generate example configuration
    pub fn example() -> Self {
        Self {
            version: "1.0".to_string(),
            webdriver_url: default_webdriver_url(),
            retries: 2,
            timeout_ms: default_timeout_ms(),
            spec_dir: default_spec_dir(),
            capabilities: vec![
                Capability::new("chrome", Browser::Chrome)
                    .with_instances(4)
                    .with_headless(),
                Capability::new("firefox", Browser::Firefox)
                    .with_instances(2)
                    .with_headless(),
            ],
        }
    }

    /// Build the immutable capability registry for this run
    pub fn registry(&self) -> CapabilityRegistry {
        CapabilityRegistry::new(self.capabilities.clone())
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.retries, 2);
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn test_config_file_example() {
        let config = ConfigFile::example();
        assert!(!config.capabilities.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_config_file_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let config = ConfigFile::example();
        config.save(&path).unwrap();

        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded.version, config.version);
        assert_eq!(loaded.webdriver_url, config.webdriver_url);
        assert_eq!(loaded.capabilities.len(), config.capabilities.len());
    }

    #[test]
    fn test_validate_zero_instances() {
        let mut config = ConfigFile::default();
        config.capabilities[0].instances = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_capability() {
        let mut config = ConfigFile::default();
        config
            .capabilities
            .push(Capability::new("chrome", Browser::Chrome));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigFile::load("/nonexistent/gridrunner.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_expand_path() {
        let path = expand_path("./test.yaml");
        assert_eq!(path, PathBuf::from("./test.yaml"));
    }
}
