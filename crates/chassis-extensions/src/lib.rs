use std::sync::Arc;

mod behaviors;
mod discovery;

use chassis_core::{BehaviorSet, BootstrapOptions, RepositoryFactory};
use chassis_kernel::{CapabilityRegistry, ChassisPlugin, Listener};

pub use behaviors::{
    Filter, ListQueryBehaviors, PaginationBehaviors, QueryDescriptor, SortDirection,
};
pub use discovery::{
    collect_behavior_sets, collect_listeners, collect_repository_factories, BehaviorSetFactory,
    ListenerFactory, RepositoryProviderFactory,
};

#[derive(Clone)]
pub struct ExtensionBundle {
    pub repositories: Vec<(String, Arc<dyn RepositoryFactory>)>,
    pub listeners: Vec<(String, Arc<dyn Listener>)>,
    pub behavior_sets: Vec<Arc<dyn BehaviorSet>>,
}

impl ExtensionBundle {
    pub fn empty() -> Self {
        Self {
            repositories: Vec::new(),
            listeners: Vec::new(),
            behavior_sets: Vec::new(),
        }
    }

    pub fn discover() -> Self {
        Self {
            repositories: collect_repository_factories(),
            listeners: collect_listeners(),
            behavior_sets: collect_behavior_sets(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty() && self.listeners.is_empty() && self.behavior_sets.is_empty()
    }

    pub fn with_defaults() -> Self {
        let bundle = Self::discover();
        if bundle.is_empty() {
            return Self {
                repositories: Vec::new(),
                listeners: Vec::new(),
                behavior_sets: vec![
                    Arc::new(ListQueryBehaviors),
                    Arc::new(PaginationBehaviors),
                ],
            };
        }
        bundle
    }

    /// Merges discovered entries into the options; explicitly supplied
    /// entries win on id collision.
    pub fn apply(&self, mut options: BootstrapOptions) -> BootstrapOptions {
        for (id, factory) in &self.repositories {
            if !options.has_repository_factory(id) {
                options = options.with_repository_factory(id, factory.clone());
            }
        }
        for (id, listener) in &self.listeners {
            if !options.has_listener(id) {
                options = options.with_listener(id, listener.clone());
            }
        }
        for set in &self.behavior_sets {
            if !options.has_behavior_set(set.id()) {
                options = options.with_behavior_set(set.clone());
            }
        }
        options
    }
}

inventory::submit! {
    BehaviorSetFactory {
        build: || Arc::new(ListQueryBehaviors),
    }
}

inventory::submit! {
    BehaviorSetFactory {
        build: || Arc::new(PaginationBehaviors),
    }
}

pub struct ExtensionsPlugin {
    bundle: ExtensionBundle,
}

impl ExtensionsPlugin {
    pub fn new(bundle: ExtensionBundle) -> Self {
        Self { bundle }
    }
}

impl ChassisPlugin for ExtensionsPlugin {
    fn register(&self, registry: &mut CapabilityRegistry) {
        registry.insert(Arc::new(self.bundle.clone()));
    }
}
