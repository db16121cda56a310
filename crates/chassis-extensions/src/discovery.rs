use std::sync::Arc;

use chassis_core::{BehaviorSet, RepositoryFactory};
use chassis_kernel::Listener;

pub struct RepositoryProviderFactory {
    pub id: &'static str,
    pub build: fn() -> Arc<dyn RepositoryFactory>,
}

pub struct ListenerFactory {
    pub id: &'static str,
    pub build: fn() -> Arc<dyn Listener>,
}

pub struct BehaviorSetFactory {
    pub build: fn() -> Arc<dyn BehaviorSet>,
}

inventory::collect!(RepositoryProviderFactory);
inventory::collect!(ListenerFactory);
inventory::collect!(BehaviorSetFactory);

pub fn collect_repository_factories() -> Vec<(String, Arc<dyn RepositoryFactory>)> {
    inventory::iter::<RepositoryProviderFactory>
        .into_iter()
        .map(|factory| (factory.id.to_string(), (factory.build)()))
        .collect()
}

pub fn collect_listeners() -> Vec<(String, Arc<dyn Listener>)> {
    inventory::iter::<ListenerFactory>
        .into_iter()
        .map(|factory| (factory.id.to_string(), (factory.build)()))
        .collect()
}

pub fn collect_behavior_sets() -> Vec<Arc<dyn BehaviorSet>> {
    inventory::iter::<BehaviorSetFactory>
        .into_iter()
        .map(|factory| (factory.build)())
        .collect()
}
