//! Managed device identity and proxy addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Addressing needed to reach a device through its parent.
///
/// `device_id` names the device whose handler owns the route (typically the
/// OLT); the remaining fields locate the subordinate device behind it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ProxyAddress {
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub channel_id: u32,
    #[serde(default)]
    pub channel_group_id: u32,
    #[serde(default)]
    pub onu_id: u32,
    #[serde(default)]
    pub onu_session_id: u32,
}

impl ProxyAddress {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, channel_id: u32, channel_group_id: u32) -> Self {
        self.channel_id = channel_id;
        self.channel_group_id = channel_group_id;
        self
    }

    pub fn with_onu(mut self, onu_id: u32, onu_session_id: u32) -> Self {
        self.onu_id = onu_id;
        self.onu_session_id = onu_session_id;
        self
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/ch{}/onu{}",
            self.device_id, self.channel_id, self.onu_id
        )
    }
}

/// A device under management.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Device {
    /// Unique device identifier; the registry key.
    pub id: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub parent_port_no: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_address: Option<ProxyAddress>,
}

impl Device {
    pub fn new(id: impl Into<String>, device_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            device_type: device_type.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>, parent_port_no: u32) -> Self {
        self.parent_id = Some(parent_id.into());
        self.parent_port_no = parent_port_no;
        self
    }

    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    pub fn with_proxy_address(mut self, proxy_address: ProxyAddress) -> Self {
        self.proxy_address = Some(proxy_address);
        self
    }

    /// Returns true if this device is reached through a parent device.
    pub fn is_proxied(&self) -> bool {
        self.proxy_address.is_some()
    }
}
