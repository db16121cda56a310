use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("call to undefined repository: {0}")]
    NotFound(String),
    #[error("repository {name} is bound to unknown implementation: {implementation}")]
    NoFactory { name: String, implementation: String },
}

/// Capability marker for named data-access objects. Domain operations are
/// caller-defined; typed access goes through `as_any` at the call site.
pub trait Repository: Send + Sync + std::fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

pub trait RepositoryFactory: Send + Sync {
    fn build(&self) -> Arc<dyn Repository>;
}

/// Name bindings are registered eagerly at bootstrap; instances are
/// constructed lazily at first resolve and cached for the registry's
/// lifetime. An unresolved name under concurrent resolves constructs at
/// most once.
pub struct RepositoryRegistry {
    bindings: RwLock<HashMap<String, String>>,
    factories: RwLock<HashMap<String, Arc<dyn RepositoryFactory>>>,
    instances: RwLock<HashMap<String, Arc<dyn Repository>>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
            factories: RwLock::new(HashMap::new()),
            instances: RwLock::new(HashMap::new()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn bind(&self, name: &str, implementation: &str) {
        let mut bindings = self.bindings.write();
        bindings.insert(name.to_string(), implementation.to_string());
    }

    pub fn register_factory(&self, implementation: &str, factory: Arc<dyn RepositoryFactory>) {
        let mut factories = self.factories.write();
        factories.insert(implementation.to_string(), factory);
    }

    pub fn bound_names(&self) -> Vec<String> {
        let bindings = self.bindings.read();
        bindings.keys().cloned().collect()
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Repository>, RepositoryError> {
        if let Some(existing) = self.instances.read().get(name) {
            return Ok(existing.clone());
        }

        let mut instances = self.instances.write();
        if let Some(existing) = instances.get(name) {
            return Ok(existing.clone());
        }

        let implementation = self
            .bindings
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))?;
        let factory = self
            .factories
            .read()
            .get(&implementation)
            .cloned()
            .ok_or_else(|| RepositoryError::NoFactory {
                name: name.to_string(),
                implementation,
            })?;

        let instance = factory.build();
        instances.insert(name.to_string(), instance.clone());
        Ok(instance)
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
