use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct Event {
    pub name: String,
    pub payload: Value,
}

impl Event {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Value::Null)
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("listener failed for event {event}: {source}")]
    Listener {
        event: String,
        source: ListenerError,
    },
}

pub trait Listener: Send + Sync {
    fn handle(&self, event: &Event) -> Result<(), ListenerError>;
}

/// Listeners run synchronously in subscription order; the first failure
/// aborts the remaining listeners of that fire call.
pub struct EventBus {
    listeners: RwLock<HashMap<String, Vec<Arc<dyn Listener>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn subscribe(&self, name: &str, listener: Arc<dyn Listener>) {
        let mut listeners = self.listeners.write();
        listeners.entry(name.to_string()).or_default().push(listener);
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        let listeners = self.listeners.read();
        listeners.get(name).map(Vec::len).unwrap_or(0)
    }

    pub fn fire(&self, event: &Event) -> Result<(), EventError> {
        let current = {
            let listeners = self.listeners.read();
            match listeners.get(&event.name) {
                Some(list) => list.clone(),
                None => return Ok(()),
            }
        };
        for listener in current {
            listener.handle(event).map_err(|source| EventError::Listener {
                event: event.name.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CapabilityRegistry {
    store: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
        }
    }

    pub fn insert<T: Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.store.insert(TypeId::of::<T>(), value);
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.store
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.clone().downcast::<T>().ok())
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub trait ChassisPlugin: Send + Sync {
    fn register(&self, registry: &mut CapabilityRegistry);
}

pub struct PluginHost {
    plugins: Vec<Arc<dyn ChassisPlugin>>,
}

impl PluginHost {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    pub fn register_plugin(&mut self, plugin: Arc<dyn ChassisPlugin>) {
        self.plugins.push(plugin);
    }

    pub fn register_all(&self, registry: &mut CapabilityRegistry) {
        for plugin in &self.plugins {
            plugin.register(registry);
        }
    }
}

impl Default for PluginHost {
    fn default() -> Self {
        Self::new()
    }
}
