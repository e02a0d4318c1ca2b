//! YAML configuration file store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::config::{DEFAULT_CONFIG_PATH, PanelConfig};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MIMIPANEL_CONFIG";

/// Loads `PanelConfig` from a YAML file on disk.
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    /// Resolve the file: explicit path, then `MIMIPANEL_CONFIG`, then the default.
    #[must_use]
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| {
                std::env::var(CONFIG_ENV)
                    .ok()
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails validation.
    pub fn load(&self) -> Result<PanelConfig> {
        let path = &self.path;
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            if content.trim().is_empty() {
                PanelConfig::default()
            } else {
                serde_yaml::from_str(&content)
                    .with_context(|| format!("cannot parse {}", path.display()))?
            }
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            PanelConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}
