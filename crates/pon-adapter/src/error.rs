//! Error types for adapter operations.
//!
//! Errors raised by the dispatcher itself are distinguished from failures
//! reported by a device handler. Handler failures of deferred lifecycle
//! operations never reach the caller; they are forwarded to the
//! [`AdapterAgent`](crate::AdapterAgent) instead.

use thiserror::Error;

/// Result type alias for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Result type alias for device handler capabilities.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Errors surfaced to the caller of an adapter operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// Malformed adapter identity or configuration.
    #[error("Invalid adapter configuration for {field}: {message}")]
    Configuration {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// No handler is registered for the device.
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    /// A handler is already registered for the device.
    #[error("Device already adopted: {0}")]
    DeviceAlreadyAdopted(String),

    /// The request violates a precondition of the operation.
    #[error("Unsupported {operation} request: {reason}")]
    UnsupportedOperation {
        /// The operation that was requested.
        operation: &'static str,
        /// What made the request unacceptable.
        reason: String,
    },

    /// The operation is an extension point this adapter does not supply.
    #[error("Operation not implemented: {0}")]
    NotImplemented(&'static str),

    /// The task scheduler no longer accepts work.
    #[error("Task scheduler is not running")]
    SchedulerStopped,

    /// A synchronous handler call failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl AdapterError {
    /// Creates a configuration error.
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        AdapterError::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported-operation error.
    pub fn unsupported(operation: &'static str, reason: impl Into<String>) -> Self {
        AdapterError::UnsupportedOperation {
            operation,
            reason: reason.into(),
        }
    }

    /// Returns true if the error names a device with no registry entry.
    pub fn is_unknown_device(&self) -> bool {
        matches!(self, AdapterError::UnknownDevice(_))
    }

    /// Returns true if the error marks an unimplemented extension point.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, AdapterError::NotImplemented(_))
    }
}

/// Failures raised inside a device handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The device rejected or failed the operation.
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// The device did not answer in time.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The operation is not valid in the device's current state.
    #[error("Invalid device state: {0}")]
    InvalidState(String),

    /// Internal handler error.
    #[error("Internal handler error: {0}")]
    Internal(String),
}
