pub mod bootstrap;
pub mod config;
pub mod extension;
pub mod helpers;
pub mod install;
pub mod migrate;
pub mod repository;
pub mod static_config;

pub use bootstrap::{
    bootstrap, BootstrapError, BootstrapOptions, ChassisBundle, ConfigSource, SchemaSettings,
};
pub use config::{ConfigError, ConfigStore};
pub use extension::{
    Behavior, BehaviorSet, ExtensionError, ExtensionRegistry, ExtensionTarget,
};
pub use helpers::{array_remove, is_json, str_remove_first, to_json};
pub use install::{
    default_config_template, InstallError, InstallOutcome, InstallState, Installer,
};
pub use migrate::{MigrationError, MigrationRunner, SqliteMigrationRunner};
pub use repository::{
    Repository, RepositoryError, RepositoryFactory, RepositoryRegistry,
};
pub use static_config::{StaticConfigItem, STATIC_CONFIG_TABLE};
