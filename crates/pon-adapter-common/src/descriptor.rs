//! Adapter self-description: identity, supported device types and health.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log verbosity an adapter is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            _ => Err(ParseError::InvalidLogLevel(s.to_string())),
        }
    }
}

/// Runtime configuration advertised in the adapter descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub log_level: LogLevel,
}

/// Immutable identity of an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterDescriptor {
    /// Adapter name, also used as its identifier.
    pub id: String,
    pub vendor: String,
    pub version: String,
    pub config: AdapterConfig,
}

impl AdapterDescriptor {
    pub fn new(
        id: impl Into<String>,
        vendor: impl Into<String>,
        version: impl Into<String>,
        config: AdapterConfig,
    ) -> Self {
        Self {
            id: id.into(),
            vendor: vendor.into(),
            version: version.into(),
            config,
        }
    }
}

/// A physical device type an adapter claims to support.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: String,
    /// Name of the adapter serving this device type.
    pub adapter: String,
    /// Whether the adapter accepts whole flow-table replacement.
    pub accepts_bulk_flow_update: bool,
}

/// The list of device types returned by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceTypes {
    pub items: Vec<DeviceType>,
}

impl DeviceTypes {
    pub fn new(items: Vec<DeviceType>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up a device type by identifier.
    pub fn get(&self, id: &str) -> Option<&DeviceType> {
        self.items.iter().find(|t| t.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthState {
    Healthy,
    Overloaded,
    Dying,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "HEALTHY"),
            HealthState::Overloaded => write!(f, "OVERLOADED"),
            HealthState::Dying => write!(f, "DYING"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            state: HealthState::Healthy,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.state == HealthState::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_log_level_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(AdapterConfig::default().log_level, LogLevel::Info);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_serde() {
        let json = serde_json::to_string(&LogLevel::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let level: LogLevel = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(level, LogLevel::Error);
    }

    #[test]
    fn test_device_types_lookup() {
        let types = DeviceTypes::new(vec![DeviceType {
            id: "onu".to_string(),
            adapter: "onu".to_string(),
            accepts_bulk_flow_update: true,
        }]);

        assert_eq!(types.len(), 1);
        assert!(types.get("onu").is_some());
        assert!(types.get("olt").is_none());
    }

    #[test]
    fn test_health_status() {
        let status = HealthStatus::healthy();
        assert!(status.is_healthy());
        assert_eq!(status.state.to_string(), "HEALTHY");
        assert!(!HealthStatus {
            state: HealthState::Overloaded
        }
        .is_healthy());
    }
}
