use std::any::Any;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chassis_core::{
    bootstrap, Behavior, BehaviorSet, BootstrapError, BootstrapOptions, ExtensionError,
    ExtensionTarget, MigrationError, MigrationRunner, Repository, RepositoryFactory,
};
use chassis_kernel::{Event, Listener, ListenerError};
use tempfile::TempDir;

#[derive(Debug)]
struct UserRepository;

impl Repository for UserRepository {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct UserRepositoryFactory;

impl RepositoryFactory for UserRepositoryFactory {
    fn build(&self) -> Arc<dyn Repository> {
        Arc::new(UserRepository)
    }
}

struct AuditListener {
    log: Arc<Mutex<Vec<String>>>,
}

impl Listener for AuditListener {
    fn handle(&self, event: &Event) -> Result<(), ListenerError> {
        let mut log = self.log.lock().expect("log lock");
        log.push(event.name.clone());
        Ok(())
    }
}

struct TagBehavior;

impl Behavior for TagBehavior {
    fn invoke(
        &self,
        target: &mut dyn Any,
        _args: &[serde_json::Value],
    ) -> Result<serde_json::Value, ExtensionError> {
        let tags = target
            .downcast_mut::<Vec<String>>()
            .ok_or_else(|| ExtensionError::BadTarget("tag".to_string()))?;
        tags.push("tagged".to_string());
        Ok(serde_json::Value::Null)
    }
}

struct TagBehaviors;

impl BehaviorSet for TagBehaviors {
    fn id(&self) -> &str {
        "tagging"
    }

    fn behaviors(&self) -> Vec<(String, Arc<dyn Behavior>)> {
        vec![("tag".to_string(), Arc::new(TagBehavior) as Arc<dyn Behavior>)]
    }
}

struct RecordingRunner {
    runs: Arc<AtomicUsize>,
}

impl MigrationRunner for RecordingRunner {
    fn run(&self, _path: &Path) -> Result<usize, MigrationError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }
}

fn inline_config(dir: &TempDir, driver: &str, body: &str) -> String {
    format!(
        r#"
[install]
marker_path = "{marker}"
config_path = "{config}"
[database]
driver = "{driver}"
migrations_path = "{migrations}"
{body}
"#,
        marker = dir.path().join("installed.marker").display(),
        config = dir.path().join("chassis.toml").display(),
        migrations = dir.path().join("migrations").display(),
    )
}

#[test]
fn bootstrap_wires_repositories_events_and_extensions() {
    let _ = tracing_subscriber::fmt().with_env_filter("chassis_core=debug").try_init();
    let dir = TempDir::new().expect("tempdir");
    let config = inline_config(
        &dir,
        "sqlite",
        r#"
[repositories]
users = "memory_users"
[events]
"user.created" = "audit"
[extensions]
query_builder = "tagging"
"#,
    );

    let log = Arc::new(Mutex::new(Vec::new()));
    let options = BootstrapOptions::from_inline(config)
        .with_repository_factory("memory_users", Arc::new(UserRepositoryFactory))
        .with_listener("audit", Arc::new(AuditListener { log: log.clone() }))
        .with_behavior_set(Arc::new(TagBehaviors));

    let bundle = bootstrap(options).expect("bootstrap");

    let first = bundle.repository("users").expect("resolve");
    let second = bundle.repository("users").expect("resolve");
    assert!(Arc::ptr_eq(&first, &second));

    bundle
        .events()
        .fire(&Event::named("user.created"))
        .expect("fire");
    assert_eq!(
        log.lock().expect("log lock").as_slice(),
        &["user.created".to_string()]
    );

    let mut tags: Vec<String> = Vec::new();
    bundle
        .extensions()
        .invoke(ExtensionTarget::QueryBuilder, "tag", &mut tags, &[])
        .expect("invoke");
    bundle
        .extensions()
        .invoke(ExtensionTarget::EntityQuery, "tag", &mut tags, &[])
        .expect("mirrored invoke");
    assert_eq!(tags.len(), 2);
}

#[test]
fn bootstrap_installs_exactly_once_across_restarts() {
    let dir = TempDir::new().expect("tempdir");
    let runs = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let config = inline_config(&dir, "mongodb", "");
        let options = BootstrapOptions::from_inline(config)
            .with_migration_runner(Arc::new(RecordingRunner { runs: runs.clone() }));
        bootstrap(options).expect("bootstrap");
    }

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(dir.path().join("installed.marker").exists());
}

#[test]
fn unknown_listener_id_fails_at_bootstrap() {
    let dir = TempDir::new().expect("tempdir");
    let config = inline_config(
        &dir,
        "sqlite",
        r#"
[events]
"user.created" = "phantom"
"#,
    );

    let err = bootstrap(BootstrapOptions::from_inline(config)).expect_err("bootstrap error");
    match err {
        BootstrapError::UnknownListener { event, listener } => {
            assert_eq!(event, "user.created");
            assert_eq!(listener, "phantom");
        }
        other => panic!("expected UnknownListener, got {other}"),
    }
}

#[test]
fn unknown_behavior_set_fails_at_bootstrap() {
    let dir = TempDir::new().expect("tempdir");
    let config = inline_config(
        &dir,
        "sqlite",
        r#"
[extensions]
query_builder = "phantom"
"#,
    );

    let err = bootstrap(BootstrapOptions::from_inline(config)).expect_err("bootstrap error");
    assert!(matches!(err, BootstrapError::UnknownBehaviorSet(_)));
}

#[test]
fn mysql_driver_populates_schema_settings() {
    let dir = TempDir::new().expect("tempdir");
    let config = inline_config(
        &dir,
        "mysql",
        r#"
[database.mysql]
default_string_length = 191
"#,
    );

    let bundle = bootstrap(BootstrapOptions::from_inline(config)).expect("bootstrap");
    assert_eq!(bundle.schema().default_string_length, Some(191));
}

#[test]
fn non_mysql_driver_leaves_schema_settings_empty() {
    let dir = TempDir::new().expect("tempdir");
    let config = inline_config(
        &dir,
        "sqlite",
        r#"
[database.mysql]
default_string_length = 191
"#,
    );

    let bundle = bootstrap(BootstrapOptions::from_inline(config)).expect("bootstrap");
    assert_eq!(bundle.schema().default_string_length, None);
}

#[test]
fn missing_config_file_is_replaced_by_the_default_template() {
    let dir = TempDir::new().expect("tempdir");
    let config_path = dir.path().join("chassis.toml");

    let bundle = bootstrap(BootstrapOptions::from_path(&config_path)).expect("bootstrap");

    assert!(config_path.exists());
    assert_eq!(bundle.config().get_string("database.driver"), "sqlite");
}
