//! Typed messages exchanged between a PON device adapter and its collaborators.
//!
//! The adapter core treats these as opaque values: it routes them to the
//! right device handler but never interprets their contents.
//!
//! - [`Device`]: a managed device and its parent/proxy addressing
//! - [`Flows`], [`FlowGroups`]: flow-table and group-table payloads
//! - [`ProxyAddress`], [`ProxiedMessage`]: routing through a parent device
//! - [`AdapterDescriptor`], [`DeviceTypes`], [`HealthStatus`]: what an adapter reports about itself

mod descriptor;
mod device;
mod flow;
mod message;

pub use descriptor::{
    AdapterConfig, AdapterDescriptor, DeviceType, DeviceTypes, HealthState, HealthStatus, LogLevel,
};
pub use device::{Device, ProxyAddress};
pub use flow::{FlowChanges, FlowEntry, FlowGroupChanges, FlowGroups, Flows, GroupEntry, GroupType};
pub use message::{
    AlarmFilter, AlarmFilterRule, InterAdapterMessage, PmConfig, PmConfigs, ProxiedMessage,
};

/// Error returned when a textual value cannot be parsed into one of the
/// enumerated message types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("invalid group type: {0}")]
    InvalidGroupType(String),
}
