//! The management surface an adapter exposes to the orchestrator.
//!
//! Lifecycle commands acknowledge receipt by returning the device they were
//! given; the real outcome arrives later through the handler's own reporting.
//! Operations with a default body are extension points: the default fails
//! with [`AdapterError::NotImplemented`] and a concrete adapter overrides the
//! ones it supports.

use crate::error::{AdapterError, AdapterResult};
use async_trait::async_trait;
use pon_adapter_common::{
    AdapterDescriptor, AlarmFilter, Device, DeviceTypes, FlowChanges, FlowGroupChanges,
    FlowGroups, Flows, HealthStatus, InterAdapterMessage, PmConfigs, ProxiedMessage, ProxyAddress,
};

#[async_trait]
pub trait AdapterInterface: Send + Sync {
    /// Called once when the adapter is brought into service.
    fn start(&self);

    /// Called once when the adapter is taken out of service.
    fn stop(&self);

    fn adapter_descriptor(&self) -> &AdapterDescriptor;

    fn device_types(&self) -> DeviceTypes;

    fn health(&self) -> HealthStatus;

    /// Creates the device's handler and schedules its activation.
    async fn adopt_device(&self, device: Device) -> AdapterResult<Device>;

    async fn disable_device(&self, device: Device) -> AdapterResult<Device>;

    async fn reenable_device(&self, device: Device) -> AdapterResult<Device>;

    async fn reboot_device(&self, device: Device) -> AdapterResult<Device>;

    async fn delete_device(&self, device: Device) -> AdapterResult<Device>;

    /// Replaces the device's flow table and returns the handler's result.
    async fn update_flows_bulk(
        &self,
        device: &Device,
        flows: Flows,
        groups: FlowGroups,
    ) -> AdapterResult<()>;

    /// Forwards `msg` through the device that owns `proxy_address`.
    async fn send_proxied_message(
        &self,
        proxy_address: &ProxyAddress,
        msg: ProxiedMessage,
    ) -> AdapterResult<()>;

    async fn update_flows_incrementally(
        &self,
        _device: &Device,
        _flow_changes: FlowChanges,
        _group_changes: FlowGroupChanges,
    ) -> AdapterResult<()> {
        Err(AdapterError::NotImplemented("update_flows_incrementally"))
    }

    async fn receive_proxied_message(
        &self,
        _proxy_address: &ProxyAddress,
        _msg: ProxiedMessage,
    ) -> AdapterResult<()> {
        Err(AdapterError::NotImplemented("receive_proxied_message"))
    }

    async fn receive_packet_out(
        &self,
        _logical_device_id: &str,
        _egress_port_no: u32,
        _msg: Vec<u8>,
    ) -> AdapterResult<()> {
        Err(AdapterError::NotImplemented("receive_packet_out"))
    }

    async fn receive_inter_adapter_message(&self, _msg: InterAdapterMessage) -> AdapterResult<()> {
        Err(AdapterError::NotImplemented("receive_inter_adapter_message"))
    }

    /// Re-attaches to a device that was already running before a restart.
    async fn reconcile_device(&self, _device: Device) -> AdapterResult<Device> {
        Err(AdapterError::NotImplemented("reconcile_device"))
    }

    async fn abandon_device(&self, _device: Device) -> AdapterResult<Device> {
        Err(AdapterError::NotImplemented("abandon_device"))
    }

    async fn get_device_details(&self, _device: &Device) -> AdapterResult<Device> {
        Err(AdapterError::NotImplemented("get_device_details"))
    }

    async fn suppress_alarm(&self, _filter: AlarmFilter) -> AdapterResult<()> {
        Err(AdapterError::NotImplemented("suppress_alarm"))
    }

    async fn unsuppress_alarm(&self, _filter: AlarmFilter) -> AdapterResult<()> {
        Err(AdapterError::NotImplemented("unsuppress_alarm"))
    }

    async fn change_master_state(&self, _master: bool) -> AdapterResult<()> {
        Err(AdapterError::NotImplemented("change_master_state"))
    }

    async fn update_pm_config(&self, _device: &Device, _pm_configs: PmConfigs) -> AdapterResult<()> {
        Err(AdapterError::NotImplemented("update_pm_config"))
    }
}
