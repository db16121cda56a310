use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chassis_kernel::{CapabilityRegistry, ChassisPlugin, EventBus, Listener, PluginHost};
use thiserror::Error;
use toml::Value;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ConfigStore};
use crate::extension::{BehaviorSet, ExtensionRegistry, ExtensionTarget};
use crate::install::{default_config_template, InstallError, Installer};
use crate::migrate::MigrationRunner;
use crate::repository::{Repository, RepositoryError, RepositoryFactory, RepositoryRegistry};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Install(#[from] InstallError),
    #[error("unknown listener for event {event}: {listener}")]
    UnknownListener { event: String, listener: String },
    #[error("unknown behavior set: {0}")]
    UnknownBehaviorSet(String),
    #[error("unknown extension target: {0}")]
    UnknownTarget(String),
}

pub enum ConfigSource {
    Path(PathBuf),
    Inline(String),
}

pub struct BootstrapOptions {
    config: ConfigSource,
    repository_factories: HashMap<String, Arc<dyn RepositoryFactory>>,
    listeners: HashMap<String, Arc<dyn Listener>>,
    behavior_sets: HashMap<String, Arc<dyn BehaviorSet>>,
    plugins: Vec<Arc<dyn ChassisPlugin>>,
    migration_runner: Option<Arc<dyn MigrationRunner>>,
}

impl BootstrapOptions {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_source(ConfigSource::Path(path.into()))
    }

    pub fn from_inline(config: impl Into<String>) -> Self {
        Self::with_source(ConfigSource::Inline(config.into()))
    }

    fn with_source(config: ConfigSource) -> Self {
        Self {
            config,
            repository_factories: HashMap::new(),
            listeners: HashMap::new(),
            behavior_sets: HashMap::new(),
            plugins: Vec::new(),
            migration_runner: None,
        }
    }

    pub fn with_repository_factory(
        mut self,
        implementation: &str,
        factory: Arc<dyn RepositoryFactory>,
    ) -> Self {
        self.repository_factories
            .insert(implementation.to_string(), factory);
        self
    }

    pub fn with_listener(mut self, id: &str, listener: Arc<dyn Listener>) -> Self {
        self.listeners.insert(id.to_string(), listener);
        self
    }

    pub fn with_behavior_set(mut self, set: Arc<dyn BehaviorSet>) -> Self {
        self.behavior_sets.insert(set.id().to_string(), set);
        self
    }

    pub fn with_plugin(mut self, plugin: Arc<dyn ChassisPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn with_migration_runner(mut self, runner: Arc<dyn MigrationRunner>) -> Self {
        self.migration_runner = Some(runner);
        self
    }

    pub fn has_repository_factory(&self, implementation: &str) -> bool {
        self.repository_factories.contains_key(implementation)
    }

    pub fn has_listener(&self, id: &str) -> bool {
        self.listeners.contains_key(id)
    }

    pub fn has_behavior_set(&self, id: &str) -> bool {
        self.behavior_sets.contains_key(id)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchemaSettings {
    pub default_string_length: Option<u32>,
}

/// The one shared context object of an application: constructed by
/// `bootstrap` exactly once at startup and passed by handle to consumers.
pub struct ChassisBundle {
    config: ConfigStore,
    repositories: Arc<RepositoryRegistry>,
    events: Arc<EventBus>,
    extensions: Arc<ExtensionRegistry>,
    capabilities: CapabilityRegistry,
    schema: SchemaSettings,
}

impl std::fmt::Debug for ChassisBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChassisBundle").finish_non_exhaustive()
    }
}

impl ChassisBundle {
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn repositories(&self) -> Arc<RepositoryRegistry> {
        self.repositories.clone()
    }

    pub fn repository(&self, name: &str) -> Result<Arc<dyn Repository>, RepositoryError> {
        self.repositories.resolve(name)
    }

    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    pub fn extensions(&self) -> Arc<ExtensionRegistry> {
        self.extensions.clone()
    }

    pub fn capability<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.capabilities.get::<T>()
    }

    pub fn schema(&self) -> SchemaSettings {
        self.schema
    }
}

/// Ordered startup: config load, first-run install, repository binding,
/// event subscription, behavior-set attachment, schema settings, plugins.
pub fn bootstrap(options: BootstrapOptions) -> Result<ChassisBundle, BootstrapError> {
    let config = load_config(&options.config)?;

    let installer = Installer::from_config(&config);
    if !installer.is_installed() {
        let outcome = installer.install(&config, options.migration_runner.as_deref())?;
        info!(
            config_published = outcome.config_published,
            migrations_applied = outcome.migrations_applied,
            "installed"
        );
    }

    let repositories = RepositoryRegistry::shared();
    for (implementation, factory) in &options.repository_factories {
        repositories.register_factory(implementation, factory.clone());
    }
    let bindings = config.repositories();
    for (name, implementation) in &bindings {
        debug!(repository = %name, implementation = %implementation, "bound repository");
        repositories.bind(name, implementation);
    }

    let events = EventBus::shared();
    let mut subscriptions = 0;
    for (event, listener_ids) in config.events() {
        for listener_id in listener_ids {
            let listener = options.listeners.get(&listener_id).cloned().ok_or_else(|| {
                BootstrapError::UnknownListener {
                    event: event.clone(),
                    listener: listener_id.clone(),
                }
            })?;
            events.subscribe(&event, listener);
            subscriptions += 1;
        }
    }

    let extensions = ExtensionRegistry::shared();
    let attachments = config.behavior_sets();
    for (target_id, set_id) in &attachments {
        let target = ExtensionTarget::parse(target_id)
            .ok_or_else(|| BootstrapError::UnknownTarget(target_id.clone()))?;
        let set = options
            .behavior_sets
            .get(set_id)
            .ok_or_else(|| BootstrapError::UnknownBehaviorSet(set_id.clone()))?;
        extensions.attach(target, set.as_ref());
    }

    let schema = schema_settings(&config);

    let mut capabilities = CapabilityRegistry::new();
    let mut host = PluginHost::new();
    for plugin in options.plugins {
        host.register_plugin(plugin);
    }
    host.register_all(&mut capabilities);

    info!(
        repositories = bindings.len(),
        subscriptions,
        behavior_sets = attachments.len(),
        "bootstrap complete"
    );

    Ok(ChassisBundle {
        config,
        repositories,
        events,
        extensions,
        capabilities,
        schema,
    })
}

fn load_config(source: &ConfigSource) -> Result<ConfigStore, ConfigError> {
    match source {
        ConfigSource::Inline(raw) => ConfigStore::from_str(raw),
        ConfigSource::Path(path) => {
            if !path.exists() {
                warn!(path = %path.display(), "config file missing, publishing default config");
                std::fs::write(path, default_config_template(path).as_bytes()).map_err(|err| {
                    ConfigError::Io {
                        path: path.display().to_string(),
                        message: err.to_string(),
                    }
                })?;
            }
            ConfigStore::load(path)
        }
    }
}

fn schema_settings(config: &ConfigStore) -> SchemaSettings {
    if config.get_string("database.driver").to_lowercase() != "mysql" {
        return SchemaSettings::default();
    }
    SchemaSettings {
        default_string_length: config
            .get("database.mysql.default_string_length")
            .and_then(Value::as_integer)
            .map(|length| length as u32),
    }
}
