use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use devprobe_core::{ServiceName, ServiceNameError, UriService};
use parking_lot::RwLock;

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Errors from registering a service.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid service name: {0}")]
    InvalidName(#[from] ServiceNameError),
    #[error("service already registered: {name}")]
    Duplicate { name: ServiceName },
}

// ---------------------------------------------------------------------------
// ServiceRegistry
// ---------------------------------------------------------------------------

/// Registry of URI services, keyed by exact service name.
///
/// Names are validated on registration and must be unique. Registration
/// order is kept so listings are deterministic.
pub struct ServiceRegistry {
    /// Name-based lookup: service name -> `Arc<dyn UriService>`.
    by_name: DashMap<ServiceName, Arc<dyn UriService>>,
    /// Registration order.
    order: RwLock<Vec<ServiceName>>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_name: DashMap::new(),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Register a service under its own `name()`.
    ///
    /// # Errors
    ///
    /// `RegistryError::InvalidName` if the name is empty or too long,
    /// `RegistryError::Duplicate` if the name is taken.
    pub fn register<T: UriService + 'static>(&self, service: T) -> Result<ServiceName, RegistryError> {
        self.register_shared(Arc::new(service))
    }

    /// Register an already shared service.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn register_shared(
        &self,
        service: Arc<dyn UriService>,
    ) -> Result<ServiceName, RegistryError> {
        let name = ServiceName::new(service.name())?;
        // Hold the order lock across the insert so listings never see a
        // service that is missing from the map or vice versa.
        let mut order = self.order.write();
        match self.by_name.entry(name.clone()) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate { name }),
            Entry::Vacant(slot) => {
                slot.insert(service);
                order.push(name.clone());
                tracing::debug!(service = %name, "service registered");
                Ok(name)
            }
        }
    }

    /// Remove a service by name, returning it if it was registered.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn UriService>> {
        let mut order = self.order.write();
        let (_, service) = self.by_name.remove(name)?;
        order.retain(|n| n.as_str() != name);
        tracing::debug!(service = name, "service unregistered");
        Some(service)
    }

    /// Retrieve a service by its exact name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn UriService>> {
        self.by_name.get(name).map(|entry| entry.value().clone())
    }

    /// Names of all registered services, in registration order.
    pub fn names(&self) -> Vec<ServiceName> {
        self.order.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
