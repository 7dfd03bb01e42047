//! Device handler capability set and the collaborators handlers see.
//!
//! A [`DeviceHandler`] translates abstract commands into device-specific
//! operations for one device. Handlers are built by a
//! [`DeviceHandlerFactory`] on adoption and receive an [`AdapterHandle`]
//! through which they report back: the [`AdapterAgent`] for failures and
//! state, and [`AdapterHandle::release_device`] once a deletion completes.

use crate::audit::{AuditCategory, AuditOutcome, AuditRecord};
use crate::audit_log;
use crate::config::AdapterOptions;
use crate::error::{HandlerError, HandlerResult};
use crate::registry::WeakDeviceHandlerRegistry;
use async_trait::async_trait;
use log::{info, warn};
use pon_adapter_common::{Device, FlowEntry, ProxiedMessage, ProxyAddress};
use std::fmt;
use std::sync::Arc;

/// Per-device runtime object implementing the adapter's commands.
///
/// Methods take `&self`; handlers keep their own mutable state behind
/// interior mutability since the registry shares them as `Arc`s.
#[async_trait]
pub trait DeviceHandler: Send + Sync {
    /// Brings a newly adopted device into service.
    async fn activate(&self, device: Device) -> HandlerResult<()>;

    async fn disable(&self) -> HandlerResult<()>;

    async fn reenable(&self) -> HandlerResult<()>;

    async fn reboot(&self) -> HandlerResult<()>;

    /// Tears the device down. The handler calls
    /// [`AdapterHandle::release_device`] when done.
    async fn delete(&self) -> HandlerResult<()>;

    /// Replaces the device's flow table with `flows`.
    async fn update_flow_table(&self, flows: Vec<FlowEntry>) -> HandlerResult<()>;

    /// Sends `msg` to the subordinate device addressed by `proxy_address`.
    async fn send_proxied_message(
        &self,
        proxy_address: &ProxyAddress,
        msg: ProxiedMessage,
    ) -> HandlerResult<()>;
}

/// Builds the handler for a newly adopted device.
pub trait DeviceHandlerFactory: Send + Sync {
    fn create(&self, adapter: AdapterHandle, device_id: &str) -> Arc<dyn DeviceHandler>;
}

/// Lifecycle operations that run deferred on the task scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceOperation {
    Activate,
    Disable,
    Reenable,
    Reboot,
    Delete,
}

impl DeviceOperation {
    /// Invokes the matching capability on `handler`.
    ///
    /// `device` is only consumed by [`DeviceOperation::Activate`].
    pub async fn invoke(self, handler: &dyn DeviceHandler, device: Device) -> HandlerResult<()> {
        match self {
            DeviceOperation::Activate => handler.activate(device).await,
            DeviceOperation::Disable => handler.disable().await,
            DeviceOperation::Reenable => handler.reenable().await,
            DeviceOperation::Reboot => handler.reboot().await,
            DeviceOperation::Delete => handler.delete().await,
        }
    }
}

impl fmt::Display for DeviceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceOperation::Activate => write!(f, "activate"),
            DeviceOperation::Disable => write!(f, "disable"),
            DeviceOperation::Reenable => write!(f, "reenable"),
            DeviceOperation::Reboot => write!(f, "reboot"),
            DeviceOperation::Delete => write!(f, "delete"),
        }
    }
}

/// Orchestrator-side collaborator of an adapter.
///
/// Deferred operations have no caller to return an error to; their failures
/// are delivered here instead.
pub trait AdapterAgent: Send + Sync {
    fn report_operation_failure(
        &self,
        device_id: &str,
        operation: DeviceOperation,
        error: &HandlerError,
    );
}

/// The adapter as seen by one of its device handlers.
#[derive(Clone)]
pub struct AdapterHandle {
    name: Arc<str>,
    agent: Arc<dyn AdapterAgent>,
    options: Arc<AdapterOptions>,
    registry: WeakDeviceHandlerRegistry,
}

impl fmt::Debug for AdapterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterHandle")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .finish()
    }
}

impl AdapterHandle {
    pub(crate) fn new(
        name: Arc<str>,
        agent: Arc<dyn AdapterAgent>,
        options: Arc<AdapterOptions>,
        registry: WeakDeviceHandlerRegistry,
    ) -> Self {
        Self {
            name,
            agent,
            options,
            registry,
        }
    }

    pub fn adapter_name(&self) -> &str {
        &self.name
    }

    pub fn agent(&self) -> &Arc<dyn AdapterAgent> {
        &self.agent
    }

    /// Adapter options, including adapter-specific settings.
    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    /// Drops the registry entry for `device_id` once its deletion is complete.
    ///
    /// Returns true if an entry was removed. After this, commands for the
    /// device fail with `UnknownDevice` until it is adopted again.
    pub async fn release_device(&self, device_id: &str) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            warn!(
                "release-device {}: adapter {} is gone",
                device_id, self.name
            );
            return false;
        };

        let released = registry.remove(device_id).await.is_some();
        if released {
            info!("release-device device_id={}", device_id);
            let record = AuditRecord::new(
                AuditCategory::DeviceRelease,
                self.name.as_ref(),
                "release_device",
            )
            .with_outcome(AuditOutcome::Success)
            .with_object_id(device_id)
            .with_object_type("device");
            audit_log!(record);
        } else {
            warn!("release-device {}: no handler registered", device_id);
        }
        released
    }
}
