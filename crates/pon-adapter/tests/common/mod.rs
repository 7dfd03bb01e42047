//! Shared test doubles for adapter integration tests.
//!
//! `MockHandler` records every capability call on a channel so tests can
//! observe deferred work, and can be gated so a call blocks until the test
//! releases it.

#![allow(dead_code)]

use async_trait::async_trait;
use pon_adapter::types::{Device, FlowEntry, ProxiedMessage, ProxyAddress};
use pon_adapter::{
    AdapterAgent, AdapterHandle, AdapterOptions, DeviceAdapter, DeviceHandler,
    DeviceHandlerFactory, DeviceOperation, HandlerError, HandlerResult, TaskScheduler,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

pub const ADAPTER_NAME: &str = "onu";

const WAIT: Duration = Duration::from_secs(5);

/// A capability invocation as seen by the handler.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerCall {
    Activate(Device),
    Disable,
    Reenable,
    Reboot,
    Delete,
    UpdateFlowTable(Vec<FlowEntry>),
    SendProxiedMessage(ProxyAddress, ProxiedMessage),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandlerEvent {
    pub device_id: String,
    pub call: HandlerCall,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailureReport {
    pub device_id: String,
    pub operation: DeviceOperation,
    pub error: HandlerError,
}

/// How handlers built by [`MockFactory`] behave.
#[derive(Clone, Default)]
pub struct Behavior {
    /// Every capability fails with this error after recording the call.
    pub fail_with: Option<HandlerError>,
    /// Every capability waits for one permit before doing anything.
    pub gate: Option<Arc<Semaphore>>,
    /// `delete` releases the device from the registry.
    pub release_on_delete: bool,
    /// `activate` for this device never completes.
    pub stall_activate: Option<String>,
}

pub struct MockHandler {
    device_id: String,
    adapter: AdapterHandle,
    behavior: Behavior,
    events: mpsc::UnboundedSender<HandlerEvent>,
}

impl MockHandler {
    async fn record(&self, call: HandlerCall) -> HandlerResult<()> {
        if let Some(gate) = &self.behavior.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        let _ = self.events.send(HandlerEvent {
            device_id: self.device_id.clone(),
            call,
        });
        match &self.behavior.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DeviceHandler for MockHandler {
    async fn activate(&self, device: Device) -> HandlerResult<()> {
        if self.behavior.stall_activate.as_deref() == Some(self.device_id.as_str()) {
            std::future::pending::<()>().await;
        }
        self.record(HandlerCall::Activate(device)).await
    }

    async fn disable(&self) -> HandlerResult<()> {
        self.record(HandlerCall::Disable).await
    }

    async fn reenable(&self) -> HandlerResult<()> {
        self.record(HandlerCall::Reenable).await
    }

    async fn reboot(&self) -> HandlerResult<()> {
        self.record(HandlerCall::Reboot).await
    }

    async fn delete(&self) -> HandlerResult<()> {
        if self.behavior.release_on_delete {
            self.adapter.release_device(&self.device_id).await;
        }
        self.record(HandlerCall::Delete).await
    }

    async fn update_flow_table(&self, flows: Vec<FlowEntry>) -> HandlerResult<()> {
        self.record(HandlerCall::UpdateFlowTable(flows)).await
    }

    async fn send_proxied_message(
        &self,
        proxy_address: &ProxyAddress,
        msg: ProxiedMessage,
    ) -> HandlerResult<()> {
        self.record(HandlerCall::SendProxiedMessage(proxy_address.clone(), msg))
            .await
    }
}

/// Builds [`MockHandler`]s and counts how many it built.
pub struct MockFactory {
    behavior: Behavior,
    created: Arc<AtomicUsize>,
    events: mpsc::UnboundedSender<HandlerEvent>,
}

impl MockFactory {
    pub fn new(behavior: Behavior, events: mpsc::UnboundedSender<HandlerEvent>) -> Self {
        Self {
            behavior,
            created: Arc::new(AtomicUsize::new(0)),
            events,
        }
    }
}

impl DeviceHandlerFactory for MockFactory {
    fn create(&self, adapter: AdapterHandle, device_id: &str) -> Arc<dyn DeviceHandler> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Arc::new(MockHandler {
            device_id: device_id.to_string(),
            adapter,
            behavior: self.behavior.clone(),
            events: self.events.clone(),
        })
    }
}

/// Agent that forwards failure reports to the test.
pub struct RecordingAgent {
    reports: mpsc::UnboundedSender<FailureReport>,
}

impl AdapterAgent for RecordingAgent {
    fn report_operation_failure(
        &self,
        device_id: &str,
        operation: DeviceOperation,
        error: &HandlerError,
    ) {
        let _ = self.reports.send(FailureReport {
            device_id: device_id.to_string(),
            operation,
            error: error.clone(),
        });
    }
}

/// An adapter wired to mock collaborators.
pub struct Harness {
    pub adapter: Arc<DeviceAdapter>,
    pub created: Arc<AtomicUsize>,
    events: mpsc::UnboundedReceiver<HandlerEvent>,
    reports: mpsc::UnboundedReceiver<FailureReport>,
}

impl Harness {
    pub fn new(behavior: Behavior) -> Self {
        Self::with_options(behavior, AdapterOptions::default())
    }

    pub fn with_options(behavior: Behavior, options: AdapterOptions) -> Self {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (reports_tx, reports) = mpsc::unbounded_channel();
        let factory = MockFactory::new(behavior, events_tx);
        let created = Arc::clone(&factory.created);
        let agent = RecordingAgent {
            reports: reports_tx,
        };

        let (scheduler, _worker) = TaskScheduler::start();
        let adapter = DeviceAdapter::new(
            Arc::new(agent),
            options,
            Arc::new(factory),
            scheduler,
            ADAPTER_NAME,
            "Acme",
            "1.0.0",
        )
        .expect("valid adapter identity");

        Self {
            adapter: Arc::new(adapter),
            created,
            events,
            reports,
        }
    }

    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Waits for the next handler call.
    pub async fn next_event(&mut self) -> HandlerEvent {
        tokio::time::timeout(WAIT, self.events.recv())
            .await
            .expect("timed out waiting for handler call")
            .expect("event channel closed")
    }

    /// Returns a handler call if one has already been recorded.
    pub fn try_event(&mut self) -> Option<HandlerEvent> {
        self.events.try_recv().ok()
    }

    /// Waits for the next failure report delivered to the agent.
    pub async fn next_report(&mut self) -> FailureReport {
        tokio::time::timeout(WAIT, self.reports.recv())
            .await
            .expect("timed out waiting for failure report")
            .expect("report channel closed")
    }

    pub fn try_report(&mut self) -> Option<FailureReport> {
        self.reports.try_recv().ok()
    }
}

pub fn onu(id: &str) -> Device {
    Device::new(id, ADAPTER_NAME)
}

pub fn event(device_id: &str, call: HandlerCall) -> HandlerEvent {
    HandlerEvent {
        device_id: device_id.to_string(),
        call,
    }
}
