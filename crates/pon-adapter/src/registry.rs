//! Device handler registry.
//!
//! Maps each device identifier to the single handler instance responsible
//! for it. The map sits behind one async `RwLock`:
//!
//! - insertion checks for an existing entry and constructs the handler while
//!   holding the write lock, so two concurrent adoptions of the same device
//!   can never both build a handler
//! - lookups hold the read lock only long enough to clone the handler `Arc`;
//!   handler methods always run after the lock is released
//! - lookups never create entries

use crate::error::{AdapterError, AdapterResult};
use crate::handler::DeviceHandler;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;

type HandlerMap = HashMap<String, Arc<dyn DeviceHandler>>;

/// Shared, lock-guarded device-id to handler table.
///
/// Cloning yields another handle to the same table. Outside this crate the
/// table is read-only: entries are added by adoption and dropped by
/// [`AdapterHandle::release_device`](crate::AdapterHandle::release_device).
///
/// ```compile_fail
/// # async fn drop_entry(registry: &pon_adapter::DeviceHandlerRegistry) {
/// registry.remove("dev-1").await;
/// # }
/// ```
///
/// ```compile_fail
/// # async fn add_entry(registry: &pon_adapter::DeviceHandlerRegistry) {
/// let _ = registry.insert_with("dev-1", || unimplemented!()).await;
/// # }
/// ```
#[derive(Clone, Default)]
pub struct DeviceHandlerRegistry {
    handlers: Arc<RwLock<HandlerMap>>,
}

impl fmt::Debug for DeviceHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DeviceHandlerRegistry");
        match self.handlers.try_read() {
            Ok(handlers) => s.field("device_count", &handlers.len()),
            Err(_) => s.field("device_count", &"<locked>"),
        };
        s.finish()
    }
}

impl DeviceHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `device_id`, building it with `build`.
    ///
    /// Fails with [`AdapterError::DeviceAlreadyAdopted`] if the device already
    /// has a handler; `build` is not called in that case.
    pub(crate) async fn insert_with<F>(
        &self,
        device_id: &str,
        build: F,
    ) -> AdapterResult<Arc<dyn DeviceHandler>>
    where
        F: FnOnce() -> Arc<dyn DeviceHandler>,
    {
        let mut handlers = self.handlers.write().await;
        match handlers.entry(device_id.to_string()) {
            Entry::Occupied(_) => Err(AdapterError::DeviceAlreadyAdopted(device_id.to_string())),
            Entry::Vacant(slot) => Ok(Arc::clone(slot.insert(build()))),
        }
    }

    /// Returns the handler for `device_id`.
    ///
    /// A missing entry is an ordering error on the caller's side (command
    /// before adoption, or after release) and yields
    /// [`AdapterError::UnknownDevice`].
    pub async fn get(&self, device_id: &str) -> AdapterResult<Arc<dyn DeviceHandler>> {
        self.handlers
            .read()
            .await
            .get(device_id)
            .cloned()
            .ok_or_else(|| AdapterError::UnknownDevice(device_id.to_string()))
    }

    /// Removes and returns the handler for `device_id`.
    pub(crate) async fn remove(&self, device_id: &str) -> Option<Arc<dyn DeviceHandler>> {
        self.handlers.write().await.remove(device_id)
    }

    pub async fn contains(&self, device_id: &str) -> bool {
        self.handlers.read().await.contains_key(device_id)
    }

    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.handlers.read().await.is_empty()
    }

    /// Returns the registered device identifiers, sorted.
    pub async fn device_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.handlers.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns a handle that does not keep the table alive.
    ///
    /// Handlers hold this form so that a handler stored in the table does not
    /// form a reference cycle with it.
    pub fn downgrade(&self) -> WeakDeviceHandlerRegistry {
        WeakDeviceHandlerRegistry {
            handlers: Arc::downgrade(&self.handlers),
        }
    }
}

/// Non-owning handle to a [`DeviceHandlerRegistry`].
#[derive(Clone, Default)]
pub struct WeakDeviceHandlerRegistry {
    handlers: Weak<RwLock<HandlerMap>>,
}

impl fmt::Debug for WeakDeviceHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakDeviceHandlerRegistry")
            .field("alive", &(self.handlers.strong_count() > 0))
            .finish()
    }
}

impl WeakDeviceHandlerRegistry {
    /// Returns the registry if it is still alive.
    pub fn upgrade(&self) -> Option<DeviceHandlerRegistry> {
        self.handlers
            .upgrade()
            .map(|handlers| DeviceHandlerRegistry { handlers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerResult;
    use async_trait::async_trait;
    use pon_adapter_common::{Device, FlowEntry, ProxiedMessage, ProxyAddress};
    use pretty_assertions::assert_eq;

    struct NullHandler;

    #[async_trait]
    impl DeviceHandler for NullHandler {
        async fn activate(&self, _device: Device) -> HandlerResult<()> {
            Ok(())
        }
        async fn disable(&self) -> HandlerResult<()> {
            Ok(())
        }
        async fn reenable(&self) -> HandlerResult<()> {
            Ok(())
        }
        async fn reboot(&self) -> HandlerResult<()> {
            Ok(())
        }
        async fn delete(&self) -> HandlerResult<()> {
            Ok(())
        }
        async fn update_flow_table(&self, _flows: Vec<FlowEntry>) -> HandlerResult<()> {
            Ok(())
        }
        async fn send_proxied_message(
            &self,
            _proxy_address: &ProxyAddress,
            _msg: ProxiedMessage,
        ) -> HandlerResult<()> {
            Ok(())
        }
    }

    fn null_handler() -> Arc<dyn DeviceHandler> {
        Arc::new(NullHandler)
    }

    #[tokio::test]
    async fn test_get_never_creates() {
        let registry = DeviceHandlerRegistry::new();

        let err = registry.get("dev-1").await.err();
        assert_eq!(err, Some(AdapterError::UnknownDevice("dev-1".to_string())));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let registry = DeviceHandlerRegistry::new();
        let inserted = registry.insert_with("dev-1", null_handler).await.unwrap();
        let found = registry.get("dev-1").await.unwrap();

        assert!(Arc::ptr_eq(&inserted, &found));
        assert_eq!(registry.len().await, 1);
        assert!(registry.contains("dev-1").await);
    }

    #[tokio::test]
    async fn test_duplicate_insert_does_not_build() {
        let registry = DeviceHandlerRegistry::new();
        registry.insert_with("dev-1", null_handler).await.unwrap();

        let mut built = false;
        let result = registry
            .insert_with("dev-1", || {
                built = true;
                null_handler()
            })
            .await;

        assert_eq!(
            result.err(),
            Some(AdapterError::DeviceAlreadyAdopted("dev-1".to_string()))
        );
        assert!(!built);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = DeviceHandlerRegistry::new();
        registry.insert_with("dev-1", null_handler).await.unwrap();

        assert!(registry.remove("dev-1").await.is_some());
        assert!(registry.remove("dev-1").await.is_none());
        assert!(registry.get("dev-1").await.is_err());
    }

    #[tokio::test]
    async fn test_device_ids_sorted() {
        let registry = DeviceHandlerRegistry::new();
        for id in ["dev-3", "dev-1", "dev-2"] {
            registry.insert_with(id, null_handler).await.unwrap();
        }
        assert_eq!(
            registry.device_ids().await,
            vec![
                "dev-1".to_string(),
                "dev-2".to_string(),
                "dev-3".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_clones_share_table() {
        let registry = DeviceHandlerRegistry::new();
        let other = registry.clone();
        registry.insert_with("dev-1", null_handler).await.unwrap();
        assert!(other.contains("dev-1").await);
    }

    #[tokio::test]
    async fn test_weak_handle() {
        let registry = DeviceHandlerRegistry::new();
        let weak = registry.downgrade();
        registry.insert_with("dev-1", null_handler).await.unwrap();

        let upgraded = weak.upgrade().unwrap();
        assert!(upgraded.contains("dev-1").await);

        drop(upgraded);
        drop(registry);
        assert!(weak.upgrade().is_none());
    }
}
