//! Configuration module
//!
//! Handles loading and managing the immutable run configuration.

#![allow(dead_code)]

mod file;

pub use file::ConfigFile;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Capability;

/// Configuration errors, all fatal before any dispatch
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("capability '{0}' is not registered")]
    UnknownCapability(String),

    #[error("spec file not found: {0}")]
    SpecNotFound(PathBuf),

    #[error("no capabilities selected")]
    NoCapabilities,

    #[error("invalid configuration: {0}")]
    InvalidValue(String),

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Immutable capability registry (name -> capability), built once at startup.
///
/// Preserves the declaration order of the config file.
#[derive(Clone, Debug)]
pub struct CapabilityRegistry {
    capabilities: Vec<Capability>,
}

impl CapabilityRegistry {
    pub fn new(capabilities: Vec<Capability>) -> Self {
        Self { capabilities }
    }

    /// Look up a capability by its registry name
    pub fn get(&self, name: &str) -> Result<&Capability, ConfigError> {
        self.capabilities
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownCapability(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.iter().any(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.capabilities.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}
