//! Configuration management for whatcan
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the binary)
//! 2. Environment variables (WHATCAN__SECTION__KEY)
//! 3. whatcan.local.toml (gitignored, local overrides)
//! 4. whatcan.toml (git-tracked, project config)
//! 5. ~/.config/whatcan/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main whatcan configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatcanConfig {
    pub store: StoreConfig,
    pub output: OutputConfig,
    pub resolve: ResolveConfig,
}

/// Where RBAC objects are read from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON snapshot of Users, UserAttributes, Roles and Bindings
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Aligned text, one row per (resourceName, resource, apiGroup)
    #[default]
    Text,
    /// One JSON document for all namespaces
    Json,
    /// Bordered tables
    Table,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Resolve namespaces concurrently
    pub parallel: bool,
}

impl WhatcanConfig {
    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        if let Some(snapshot) = &self.store.snapshot {
            if snapshot.is_relative() {
                self.store.snapshot = Some(base.join(snapshot));
            }
        }
    }

    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(snapshot) = &self.store.snapshot {
            if snapshot.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError(
                    "store.snapshot must not be empty".to_string(),
                ));
            }
            if snapshot.is_dir() {
                return Err(ConfigError::ValidationError(format!(
                    "store.snapshot {} is a directory",
                    snapshot.display()
                )));
            }
        }
        Ok(())
    }
}
