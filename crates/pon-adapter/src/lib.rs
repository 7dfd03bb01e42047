//! Device adapter core for PON access networks.
//!
//! An adapter is the bridge between a generic device-management orchestrator
//! and devices of one specific type. This crate provides the parts every
//! adapter shares:
//!
//! - [`AdapterInterface`]: the operations an orchestrator invokes
//! - [`DeviceAdapter`]: the standard implementation, dispatching commands
//!   to per-device handlers
//! - [`DeviceHandler`]: the per-device capability set an adapter author writes
//! - [`DeviceHandlerRegistry`]: device id to handler table
//! - [`TaskScheduler`]: deferred execution of lifecycle commands
//!
//! # Architecture
//!
//! 1. The orchestrator adopts a device; the adapter asks its
//!    [`DeviceHandlerFactory`] for a handler and registers it
//! 2. Lifecycle commands (activate, disable, reenable, reboot, delete) are
//!    queued on the scheduler and acknowledged immediately
//! 3. Flow updates and proxied messages run on the caller's task and return
//!    the handler's result
//! 4. Deferred failures go to the [`AdapterAgent`]
//! 5. A handler finishing a delete calls [`AdapterHandle::release_device`]
//!
//! # Example
//!
//! ```ignore
//! use pon_adapter::{AdapterInterface, AdapterOptions, DeviceAdapter, TaskScheduler};
//!
//! let (scheduler, _worker) = TaskScheduler::start();
//! let adapter = DeviceAdapter::new(
//!     agent,
//!     AdapterOptions::load_or_default("/etc/onu-adapter.yaml")?,
//!     Arc::new(OnuHandlerFactory),
//!     scheduler,
//!     "onu",
//!     "Acme",
//!     "1.0.0",
//! )?;
//! adapter.start();
//! adapter.adopt_device(Device::new("dev-1", "onu")).await?;
//! ```

pub mod audit;

mod adapter;
mod config;
mod error;
mod handler;
mod interface;
mod registry;
mod scheduler;

pub use adapter::DeviceAdapter;
pub use config::AdapterOptions;
pub use error::{AdapterError, AdapterResult, HandlerError, HandlerResult};
pub use handler::{AdapterAgent, AdapterHandle, DeviceHandler, DeviceHandlerFactory, DeviceOperation};
pub use interface::AdapterInterface;
pub use registry::{DeviceHandlerRegistry, WeakDeviceHandlerRegistry};
pub use scheduler::TaskScheduler;

pub use pon_adapter_common as types;
