//! Sync configuration
//!
//! Loaded through [`csl_fs::load_config`], so TOML, JSON and YAML files all
//! work. Every section is optional:
//!
//! ```toml
//! root = "schema"
//!
//! [render]
//! file_legacy = true
//! remote_table_legacy = false
//! remote_function_legacy = true
//!
//! [logging]
//! level = "debug"
//!
//! [sync]
//! dry_run = false
//! ```

use std::path::{Path, PathBuf};

use csl_fs::{NormalizedPath, load_config, save_config};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ObjectKind;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Which command form is rendered for each destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// `use_legacy` for definition files
    pub file_legacy: bool,
    /// `use_legacy` when pushing tables to the remote engine
    pub remote_table_legacy: bool,
    /// `use_legacy` when pushing functions to the remote engine
    pub remote_function_legacy: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            file_legacy: true,
            remote_table_legacy: false,
            remote_function_legacy: true,
        }
    }
}

impl RenderConfig {
    /// `use_legacy` for a remote push of the given kind.
    pub fn remote_legacy(&self, kind: ObjectKind) -> bool {
        match kind {
            ObjectKind::Table => self.remote_table_legacy,
            ObjectKind::Function => self.remote_function_legacy,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Engine behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    /// Describe changes without touching files or the remote engine
    pub dry_run: bool,
}

/// Top-level sync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Definition root folder; relative paths resolve against the config file
    pub root: PathBuf,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
    pub sync: SyncSection,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("schema"),
            render: RenderConfig::default(),
            logging: LoggingConfig::default(),
            sync: SyncSection::default(),
        }
    }
}

impl SyncConfig {
    /// Load and validate a configuration file.
    ///
    /// A relative `root` is resolved against the directory holding the file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_native(),
            });
        }

        let mut config: SyncConfig = load_config(path)?;
        config.validate(path.as_ref())?;

        if config.root.is_relative()
            && let Some(parent) = path.parent()
        {
            config.root = parent.to_native().join(&config.root);
        }

        tracing::debug!(config = %path, root = %config.root.display(), "loaded sync config");
        Ok(config)
    }

    /// Save the configuration; format follows the file extension.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        save_config(path, self)?;
        Ok(())
    }

    /// The definition root as a normalized path.
    pub fn root_path(&self) -> NormalizedPath {
        NormalizedPath::new(&self.root)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(Error::InvalidConfig {
                path: path.to_path_buf(),
                message: "root must not be empty".to_string(),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::InvalidConfig {
                path: path.to_path_buf(),
                message: format!(
                    "unknown log level '{}', expected one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }
}
