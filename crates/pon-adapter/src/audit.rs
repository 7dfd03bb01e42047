//! Structured audit logging for adapter and device lifecycle events.
//!
//! Audit records are emitted on the `audit` tracing target as a single
//! JSON document per event so they can be shipped to a collector separately
//! from operational logs.
//!
//! | Category | Emitted for |
//! |----------|-------------|
//! | `ADAPTER_LIFECYCLE` | adapter start and stop |
//! | `DEVICE_ADOPT` | adoption accepted or rejected |
//! | `DEVICE_RELEASE` | registry entry released after delete |
//! | `DEVICE_OPERATION` | lifecycle operation queued (in progress) or failed |
//! | `ERROR_CONDITION` | scheduled task panicked or was cancelled |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Audit event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditCategory {
    /// Adapter start and stop
    AdapterLifecycle,
    /// Handler creation for a newly adopted device
    DeviceAdopt,
    /// Handler removal from the registry
    DeviceRelease,
    /// Lifecycle command executed by a device handler
    DeviceOperation,
    /// Scheduled task aborted outside any handler result
    ErrorCondition,
}

impl fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditCategory::AdapterLifecycle => write!(f, "ADAPTER_LIFECYCLE"),
            AuditCategory::DeviceAdopt => write!(f, "DEVICE_ADOPT"),
            AuditCategory::DeviceRelease => write!(f, "DEVICE_RELEASE"),
            AuditCategory::DeviceOperation => write!(f, "DEVICE_OPERATION"),
            AuditCategory::ErrorCondition => write!(f, "ERROR_CONDITION"),
        }
    }
}

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
    InProgress,
    Denied,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Success => write!(f, "success"),
            AuditOutcome::Failure => write!(f, "failure"),
            AuditOutcome::InProgress => write!(f, "in_progress"),
            AuditOutcome::Denied => write!(f, "denied"),
        }
    }
}

/// A single audit event.
///
/// Built with the `with_*` methods and handed to [`audit_log!`](crate::audit_log).
/// The outcome starts as `InProgress` until set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// UTC time the record was created
    pub timestamp: DateTime<Utc>,

    pub category: AuditCategory,

    /// Adapter name that generated the event
    pub source: String,

    /// What happened, e.g. `adopt_device`
    pub action: String,

    pub outcome: AuditOutcome,

    /// Affected object, usually a device identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    /// Examples: "device", "adapter"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Failure reason when outcome is Failure or Denied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditRecord {
    /// Creates a record stamped with the current time.
    pub fn new(
        category: AuditCategory,
        source: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            category,
            source: source.into(),
            action: action.into(),
            outcome: AuditOutcome::InProgress,
            object_id: None,
            object_type: None,
            details: None,
            error: None,
        }
    }

    pub fn with_outcome(mut self, outcome: AuditOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_object_id(mut self, id: impl Into<String>) -> Self {
        self.object_id = Some(id.into());
        self
    }

    pub fn with_object_type(mut self, obj_type: impl Into<String>) -> Self {
        self.object_type = Some(obj_type.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Sets the error message and marks the outcome as Failure.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.outcome = AuditOutcome::Failure;
        self
    }

    /// Sets the error message and marks the outcome as Denied.
    pub fn denied(mut self, reason: impl Into<String>) -> Self {
        self.error = Some(reason.into());
        self.outcome = AuditOutcome::Denied;
        self
    }

    /// Serializes the record to a single-line JSON document.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization_failed","message":"{}"}}"#, e))
    }
}

/// Emits an [`AuditRecord`] on the `audit` target.
///
/// Success is logged at info, InProgress at debug, Failure and Denied at warn.
///
/// ```ignore
/// let record = AuditRecord::new(AuditCategory::DeviceAdopt, "onu", "adopt_device")
///     .with_outcome(AuditOutcome::Success)
///     .with_object_id("dev-1")
///     .with_object_type("device");
/// audit_log!(record);
/// ```
#[macro_export]
macro_rules! audit_log {
    ($record:expr) => {
        let record = $record;
        match record.outcome {
            $crate::audit::AuditOutcome::Success => {
                tracing::info!(
                    target: "audit",
                    category = %record.category,
                    source = %record.source,
                    action = %record.action,
                    outcome = %record.outcome,
                    audit_json = %record.to_json(),
                    "AUDIT: {} - {} - {}",
                    record.category,
                    record.action,
                    record.outcome
                );
            }
            $crate::audit::AuditOutcome::InProgress => {
                tracing::debug!(
                    target: "audit",
                    category = %record.category,
                    source = %record.source,
                    action = %record.action,
                    outcome = %record.outcome,
                    audit_json = %record.to_json(),
                    "AUDIT: {} - {} - {}",
                    record.category,
                    record.action,
                    record.outcome
                );
            }
            $crate::audit::AuditOutcome::Failure | $crate::audit::AuditOutcome::Denied => {
                tracing::warn!(
                    target: "audit",
                    category = %record.category,
                    source = %record.source,
                    action = %record.action,
                    outcome = %record.outcome,
                    error = record.error.as_deref().unwrap_or(""),
                    audit_json = %record.to_json(),
                    "AUDIT: {} - {} - {}",
                    record.category,
                    record.action,
                    record.outcome
                );
            }
        }
    };
}
