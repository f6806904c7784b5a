//! Dependency lookup for service parameters and target instances.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use verb_dispatch_core::Service;

/// Resolves dependencies by key.
///
/// Keys are the strings declared by `ServiceKind::Dependency` and
/// `Target::Instance`; typed declarations use [`std::any::type_name`].
pub trait ServiceProvider: Send + Sync {
    /// Returns the service registered under `key`, if any.
    fn resolve(&self, key: &str) -> Option<Service>;
}

/// Map-backed [`ServiceProvider`].
///
/// # Examples
///
/// ```
/// use verb_dispatch_binder::{ServiceProvider, ServiceRegistry};
///
/// struct Database {
///     url: String,
/// }
///
/// let mut registry = ServiceRegistry::new();
/// registry.insert_typed(Database { url: "sqlite::memory:".into() });
/// registry.insert("greeting", String::from("hello"));
///
/// let db = registry
///     .resolve(std::any::type_name::<Database>())
///     .and_then(|s| s.downcast::<Database>().ok())
///     .unwrap();
/// assert_eq!(db.url, "sqlite::memory:");
/// assert!(registry.resolve("missing").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Service>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` under `key`, replacing any previous entry.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: &str, value: T) -> &mut Self {
        self.insert_shared(key, Arc::new(value))
    }

    /// Registers an already shared service under `key`.
    pub fn insert_shared(&mut self, key: &str, service: Service) -> &mut Self {
        self.services.insert(key.to_string(), service);
        self
    }

    /// Registers `value` under the type name of `T`.
    pub fn insert_typed<T: Any + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.insert(type_name::<T>(), value)
    }

    /// Returns `true` if `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.services.contains_key(key)
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.services.keys().collect();
        keys.sort();
        f.debug_struct("ServiceRegistry").field("keys", &keys).finish()
    }
}

impl ServiceProvider for ServiceRegistry {
    fn resolve(&self, key: &str) -> Option<Service> {
        self.services.get(key).cloned()
    }
}
