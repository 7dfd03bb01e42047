//! DeviceAdapter: descriptor, capability registry and command dispatch.

use crate::audit::{AuditCategory, AuditOutcome, AuditRecord};
use crate::audit_log;
use crate::config::AdapterOptions;
use crate::error::{AdapterError, AdapterResult};
use crate::handler::{AdapterAgent, AdapterHandle, DeviceHandler, DeviceHandlerFactory, DeviceOperation};
use crate::interface::AdapterInterface;
use crate::registry::DeviceHandlerRegistry;
use crate::scheduler::TaskScheduler;
use async_trait::async_trait;
use log::{debug, info, warn};
use pon_adapter_common::{
    AdapterDescriptor, Device, DeviceType, DeviceTypes, FlowGroups, Flows, HealthStatus,
    ProxiedMessage, ProxyAddress,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Adapter for a single device type.
///
/// Owns the device handler registry. Lifecycle commands (adopt, disable,
/// reenable, reboot, delete) are queued on the shared [`TaskScheduler`] and
/// return as soon as the call is queued. Bulk flow updates and proxied
/// messages are awaited in the caller's task because the caller needs the
/// handler's answer.
pub struct DeviceAdapter {
    name: Arc<str>,
    descriptor: AdapterDescriptor,
    supported_device_types: Vec<DeviceType>,
    options: Arc<AdapterOptions>,
    agent: Arc<dyn AdapterAgent>,
    handler_factory: Arc<dyn DeviceHandlerFactory>,
    registry: DeviceHandlerRegistry,
    scheduler: TaskScheduler,
    started: AtomicBool,
}

impl fmt::Debug for DeviceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceAdapter")
            .field("descriptor", &self.descriptor)
            .field("supported_device_types", &self.supported_device_types)
            .field("registry", &self.registry)
            .field("started", &self.started.load(Ordering::Relaxed))
            .finish()
    }
}

fn require_non_empty(field: &str, value: &str) -> AdapterResult<()> {
    if value.trim().is_empty() {
        return Err(AdapterError::configuration(field, "must not be empty"));
    }
    Ok(())
}

impl DeviceAdapter {
    /// Creates an adapter supporting one device type named after the adapter.
    ///
    /// `handler_factory` is kept for later adoptions; `scheduler` is the
    /// shared queue lifecycle commands are deferred onto.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if `name`, `vendor` or
    /// `version` is empty.
    pub fn new(
        agent: Arc<dyn AdapterAgent>,
        options: AdapterOptions,
        handler_factory: Arc<dyn DeviceHandlerFactory>,
        scheduler: TaskScheduler,
        name: &str,
        vendor: &str,
        version: &str,
    ) -> AdapterResult<Self> {
        require_non_empty("name", name)?;
        require_non_empty("vendor", vendor)?;
        require_non_empty("version", version)?;

        debug!("Initializing adapter: {} {} {}", vendor, name, version);

        let supported_device_types = vec![DeviceType {
            id: name.to_string(),
            adapter: name.to_string(),
            accepts_bulk_flow_update: true,
        }];
        let descriptor = AdapterDescriptor::new(name, vendor, version, options.adapter_config());

        Ok(Self {
            name: Arc::from(name),
            descriptor,
            supported_device_types,
            options: Arc::new(options),
            agent,
            handler_factory,
            registry: DeviceHandlerRegistry::new(),
            scheduler,
            started: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    /// The device handler table.
    pub fn registry(&self) -> &DeviceHandlerRegistry {
        &self.registry
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Returns the handle passed to device handlers.
    pub fn handle(&self) -> AdapterHandle {
        AdapterHandle::new(
            Arc::clone(&self.name),
            Arc::clone(&self.agent),
            Arc::clone(&self.options),
            self.registry.downgrade(),
        )
    }

    /// Queues `operation` on `handler`.
    ///
    /// Failures are logged, audited and forwarded to the agent from the
    /// worker; they never reach the submitter.
    fn submit(
        &self,
        handler: Arc<dyn DeviceHandler>,
        operation: DeviceOperation,
        device: Device,
    ) -> AdapterResult<()> {
        let agent = Arc::clone(&self.agent);
        let source = Arc::clone(&self.name);
        let lane = device.id.clone();

        self.scheduler.schedule(lane, async move {
            let device_id = device.id.clone();
            if let Err(e) = operation.invoke(handler.as_ref(), device).await {
                warn!("{} of device {} failed: {}", operation, device_id, e);

                let record = operation_record(&source, operation, &device_id)
                    .with_error(e.to_string());
                audit_log!(record);

                agent.report_operation_failure(&device_id, operation, &e);
            }
        })
    }

    /// Looks up the device's handler and queues `operation` on it.
    async fn dispatch(&self, device: Device, operation: DeviceOperation) -> AdapterResult<Device> {
        info!("{}-device device_id={}", operation, device.id);
        let handler = self.registry.get(&device.id).await?;
        self.submit(handler, operation, device.clone())?;

        audit_log!(operation_record(&self.name, operation, &device.id));
        Ok(device)
    }
}

/// Audit record for a lifecycle operation on a device; starts out in progress.
fn operation_record(source: &str, operation: DeviceOperation, device_id: &str) -> AuditRecord {
    AuditRecord::new(AuditCategory::DeviceOperation, source, operation.to_string())
        .with_object_id(device_id)
        .with_object_type("device")
}

#[async_trait]
impl AdapterInterface for DeviceAdapter {
    fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("Adapter {} already started", self.name);
            return;
        }
        info!("Starting adapter: {}", self.name);

        let record = AuditRecord::new(AuditCategory::AdapterLifecycle, self.name.as_ref(), "start")
            .with_outcome(AuditOutcome::Success)
            .with_object_id(self.name.as_ref())
            .with_object_type("adapter")
            .with_details(serde_json::json!({
                "vendor": self.descriptor.vendor,
                "version": self.descriptor.version,
            }));
        audit_log!(record);
    }

    fn stop(&self) {
        if !self.started.swap(false, Ordering::SeqCst) {
            debug!("Adapter {} is not running", self.name);
            return;
        }
        info!("Stopping adapter: {}", self.name);

        let record = AuditRecord::new(AuditCategory::AdapterLifecycle, self.name.as_ref(), "stop")
            .with_outcome(AuditOutcome::Success)
            .with_object_id(self.name.as_ref())
            .with_object_type("adapter");
        audit_log!(record);
    }

    fn adapter_descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn device_types(&self) -> DeviceTypes {
        DeviceTypes::new(self.supported_device_types.clone())
    }

    fn health(&self) -> HealthStatus {
        HealthStatus::healthy()
    }

    async fn adopt_device(&self, device: Device) -> AdapterResult<Device> {
        info!("adopt-device device_id={}", device.id);

        let handle = self.handle();
        let inserted = self
            .registry
            .insert_with(&device.id, || self.handler_factory.create(handle, &device.id))
            .await;

        let handler = match inserted {
            Ok(handler) => handler,
            Err(e) => {
                let record =
                    AuditRecord::new(AuditCategory::DeviceAdopt, self.name.as_ref(), "adopt_device")
                        .with_object_id(&device.id)
                        .with_object_type("device")
                        .denied(e.to_string());
                audit_log!(record);
                return Err(e);
            }
        };

        if let Err(e) = self.submit(handler, DeviceOperation::Activate, device.clone()) {
            // Nothing will ever activate this handler; undo the insert.
            self.registry.remove(&device.id).await;

            let record =
                AuditRecord::new(AuditCategory::DeviceAdopt, self.name.as_ref(), "adopt_device")
                    .with_object_id(&device.id)
                    .with_object_type("device")
                    .with_error(e.to_string());
            audit_log!(record);
            return Err(e);
        }

        let record = AuditRecord::new(AuditCategory::DeviceAdopt, self.name.as_ref(), "adopt_device")
            .with_outcome(AuditOutcome::Success)
            .with_object_id(&device.id)
            .with_object_type("device")
            .with_details(serde_json::json!({
                "device_type": device.device_type,
            }));
        audit_log!(record);

        Ok(device)
    }

    async fn disable_device(&self, device: Device) -> AdapterResult<Device> {
        self.dispatch(device, DeviceOperation::Disable).await
    }

    async fn reenable_device(&self, device: Device) -> AdapterResult<Device> {
        self.dispatch(device, DeviceOperation::Reenable).await
    }

    async fn reboot_device(&self, device: Device) -> AdapterResult<Device> {
        self.dispatch(device, DeviceOperation::Reboot).await
    }

    /// Queues the handler's delete. The registry entry stays until the
    /// handler calls [`AdapterHandle::release_device`].
    async fn delete_device(&self, device: Device) -> AdapterResult<Device> {
        self.dispatch(device, DeviceOperation::Delete).await
    }

    async fn update_flows_bulk(
        &self,
        device: &Device,
        flows: Flows,
        groups: FlowGroups,
    ) -> AdapterResult<()> {
        info!(
            "bulk-flow-update device_id={} flows={} groups={}",
            device.id,
            flows.len(),
            groups.len()
        );

        if !groups.is_empty() {
            return Err(AdapterError::unsupported(
                "update_flows_bulk",
                format!("{} group entries supplied, groups are not supported", groups.len()),
            ));
        }

        let handler = self.registry.get(&device.id).await?;
        handler.update_flow_table(flows.items).await?;
        Ok(())
    }

    async fn send_proxied_message(
        &self,
        proxy_address: &ProxyAddress,
        msg: ProxiedMessage,
    ) -> AdapterResult<()> {
        info!(
            "send-proxied-message proxy_address={} bytes={}",
            proxy_address,
            msg.len()
        );

        let handler = self.registry.get(&proxy_address.device_id).await?;
        handler.send_proxied_message(proxy_address, msg).await?;
        Ok(())
    }
}
