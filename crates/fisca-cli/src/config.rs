//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! catalog_path: /etc/fisca/catalog.yaml
//! log_format: json
//! ```
//!
//! The catalog is resolved in this order: the `FISCA_CATALOG` environment
//! variable, `catalog_path` from the config file, then the catalog compiled
//! into the binary. The environment is read once, by [`CliConfig::from_env`];
//! a constructed config never consults it again.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use fisca_catalog::ObligationCatalog;

/// Environment variable overriding the catalog path.
pub const CATALOG_ENV: &str = "FISCA_CATALOG";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Contents of the `--config` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Catalog YAML to load instead of the built-in one.
    pub catalog_path: Option<PathBuf>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load the config file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Load the config file, then apply the [`CATALOG_ENV`] override.
    pub fn from_env(path: Option<&Path>) -> Result<Self> {
        let env_override = std::env::var_os(CATALOG_ENV).map(PathBuf::from);
        Ok(Self::load(path)?.with_catalog_override(env_override))
    }

    /// Replace the catalog path with `path` when it is set and non-empty.
    pub fn with_catalog_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) {
            self.catalog_path = Some(path);
        }
        self
    }

    /// Load the catalog this configuration points at.
    pub fn load_catalog(&self) -> Result<ObligationCatalog> {
        match &self.catalog_path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading catalog");
                ObligationCatalog::from_path(path)
                    .with_context(|| format!("failed to load catalog {}", path.display()))
            }
            None => ObligationCatalog::builtin().context("built-in catalog is invalid"),
        }
    }
}
