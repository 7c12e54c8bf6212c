//! Configuration loader with multi-source merging

use crate::{Paths, WhatcanConfig};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Prefix of `WHATCAN__SECTION__KEY` overrides.
const ENV_PREFIX: &str = "WHATCAN";

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    include_user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            include_user_config: true,
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Skip ~/.config/whatcan/config.toml
    #[cfg(test)]
    fn without_user_config(mut self) -> Self {
        self.include_user_config = false;
        self
    }

    /// Load configuration from all sources with proper precedence
    pub fn load(self) -> Result<WhatcanConfig> {
        let mut builder = config::Config::builder();

        // 1. Start with built-in defaults
        let defaults = WhatcanConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. User config (~/.config/whatcan/config.toml)
        if self.include_user_config {
            if let Ok(user_config_file) = Paths::new().user_config_file() {
                if user_config_file.exists() {
                    builder = builder.add_source(
                        config::File::from(user_config_file)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // 3. Project config (whatcan.toml)
        let project_config_file = Paths::project_config_file(&self.project_dir);
        if project_config_file.exists() {
            builder = builder.add_source(
                config::File::from(project_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 4. Local config (whatcan.local.toml, gitignored)
        let local_config_file = Paths::local_config_file(&self.project_dir);
        if local_config_file.exists() {
            builder = builder.add_source(
                config::File::from(local_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 5. Environment variables (WHATCAN__OUTPUT__FORMAT=json)
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut whatcan_config: WhatcanConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        whatcan_config.resolve_paths(&self.project_dir);
        whatcan_config.validate()?;

        Ok(whatcan_config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
