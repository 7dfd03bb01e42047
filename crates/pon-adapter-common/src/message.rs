//! Opaque messages routed through an adapter: proxied payloads,
//! inter-adapter messages, alarm filters and PM configuration.

use serde::{Deserialize, Serialize};

/// Payload sent to a subordinate device through its parent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProxiedMessage {
    pub payload: Vec<u8>,
}

impl ProxiedMessage {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Message exchanged directly between two adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterAdapterMessage {
    pub id: String,
    pub message_type: String,
    pub to_device_id: String,
    #[serde(default)]
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmFilterRule {
    pub key: String,
    pub value: String,
}

/// Set of rules selecting alarms to suppress.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlarmFilter {
    pub id: String,
    #[serde(default)]
    pub rules: Vec<AlarmFilterRule>,
}

/// Collection settings for one performance-monitoring metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmConfig {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub sample_freq: u32,
}

/// Performance-monitoring configuration for a device.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PmConfigs {
    /// Device the configuration applies to.
    pub id: String,
    #[serde(default)]
    pub default_freq: u32,
    #[serde(default)]
    pub grouped: bool,
    #[serde(default)]
    pub freq_override: bool,
    #[serde(default)]
    pub metrics: Vec<PmConfig>,
}
