//! Adapter configuration.
//!
//! Loaded from YAML. Every field has a default so an empty or missing file
//! yields a usable configuration. Keys the core does not know are kept as
//! adapter-specific settings for device handlers to read.

use crate::error::{AdapterError, AdapterResult};
use pon_adapter_common::{AdapterConfig, LogLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Configuration passed to [`DeviceAdapter::new`](crate::DeviceAdapter::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterOptions {
    /// Log level advertised in the adapter descriptor
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Adapter-specific settings, opaque to the core
    #[serde(flatten)]
    pub settings: BTreeMap<String, serde_json::Value>,
}

fn read_error(path: &Path, e: io::Error) -> AdapterError {
    AdapterError::configuration(
        "options",
        format!("failed to read {}: {}", path.display(), e),
    )
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            settings: BTreeMap::new(),
        }
    }
}

impl AdapterOptions {
    /// Parses options from a YAML document.
    pub fn from_yaml_str(content: &str) -> AdapterResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| AdapterError::configuration("options", format!("invalid YAML: {}", e)))
    }

    /// Loads options from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> AdapterResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| read_error(path, e))?;
        Self::from_yaml_str(&content)
    }

    /// Loads options from a YAML file, falling back to defaults if it does not exist.
    ///
    /// Only a missing file selects the defaults; any other read failure is
    /// a configuration error.
    pub fn load_or_default(path: impl AsRef<Path>) -> AdapterResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Self::from_yaml_str(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "Adapter config {} not found, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(read_error(path, e)),
        }
    }

    /// Sets the descriptor log level.
    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    /// Adds an adapter-specific setting.
    pub fn with_setting(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// Returns an adapter-specific setting.
    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }

    /// Returns the descriptor-level view of these options.
    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            log_level: self.log_level,
        }
    }
}
