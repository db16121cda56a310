use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

/// The two capability surfaces behaviors can attach to. Sets attached to
/// the generic query-builder surface are mirrored onto the entity-query
/// surface so both gain identical behavior.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ExtensionTarget {
    QueryBuilder,
    EntityQuery,
}

impl ExtensionTarget {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "query_builder" | "query-builder" => Some(Self::QueryBuilder),
            "entity_query" | "entity-query" => Some(Self::EntityQuery),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("unknown extension method {method} on {target:?}")]
    UnknownMethod {
        target: ExtensionTarget,
        method: String,
    },
    #[error("behavior {0} cannot operate on the supplied target")]
    BadTarget(String),
    #[error("behavior {0} failed: {1}")]
    Invocation(String, String),
}

pub trait Behavior: Send + Sync {
    fn invoke(&self, target: &mut dyn Any, args: &[Value]) -> Result<Value, ExtensionError>;
}

pub trait BehaviorSet: Send + Sync {
    fn id(&self) -> &str;
    fn behaviors(&self) -> Vec<(String, Arc<dyn Behavior>)>;
}

pub struct ExtensionRegistry {
    surfaces: RwLock<HashMap<ExtensionTarget, Vec<(String, Arc<dyn Behavior>)>>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self {
            surfaces: RwLock::new(HashMap::new()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn attach(&self, target: ExtensionTarget, set: &dyn BehaviorSet) {
        let behaviors = set.behaviors();
        let mut surfaces = self.surfaces.write();
        surfaces
            .entry(target)
            .or_default()
            .extend(behaviors.iter().cloned());
        if target == ExtensionTarget::QueryBuilder {
            surfaces
                .entry(ExtensionTarget::EntityQuery)
                .or_default()
                .extend(behaviors);
        }
    }

    /// Most recent attachment wins when a method name repeats on a surface.
    pub fn find(&self, target: ExtensionTarget, method: &str) -> Option<Arc<dyn Behavior>> {
        let surfaces = self.surfaces.read();
        surfaces.get(&target).and_then(|entries| {
            entries
                .iter()
                .rev()
                .find(|(name, _)| name == method)
                .map(|(_, behavior)| behavior.clone())
        })
    }

    pub fn methods(&self, target: ExtensionTarget) -> Vec<String> {
        let surfaces = self.surfaces.read();
        surfaces
            .get(&target)
            .map(|entries| entries.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn invoke(
        &self,
        target: ExtensionTarget,
        method: &str,
        subject: &mut dyn Any,
        args: &[Value],
    ) -> Result<Value, ExtensionError> {
        let behavior = self
            .find(target, method)
            .ok_or_else(|| ExtensionError::UnknownMethod {
                target,
                method: method.to_string(),
            })?;
        behavior.invoke(subject, args)
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
