use chassis_core::{ConfigError, ConfigStore};

#[test]
fn dotted_lookup_traverses_nested_tables() {
    let config = ConfigStore::from_str(
        r#"
[database]
driver = "mysql"
[database.mysql]
default_string_length = 191
"#,
    )
    .expect("config");
    assert_eq!(config.get_string("database.driver"), "mysql");
    assert_eq!(config.get_number("database.mysql.default_string_length"), 191);
}

#[test]
fn get_or_returns_default_when_path_is_absent_or_not_a_table() {
    let config = ConfigStore::from_str(
        r#"
[a]
b = 1
"#,
    )
    .expect("config");
    assert_eq!(config.get_or("a.b.c", 5), 5);
    assert_eq!(config.get_or("missing.b.c", 5), 5);
    assert_eq!(config.get_or("a.b", 5), 1);
}

#[test]
fn scalar_getters_fall_back_to_package_defaults() {
    let config = ConfigStore::from_str("").expect("config");
    assert_eq!(config.get_string("database.driver"), "sqlite");
    assert_eq!(config.get_string("install.marker_path"), ".chassis-installed");
    assert_eq!(config.get_string("no.such.key"), "");
    assert_eq!(config.get_number("no.such.key"), 0);
    assert!(!config.get_bool("no.such.key"));
}

#[test]
fn malformed_source_is_a_parse_error() {
    let err = ConfigStore::from_str("not [ valid = toml").expect_err("error");
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn repositories_section_maps_names_to_implementations() {
    let config = ConfigStore::from_str(
        r#"
[repositories]
users = "memory_users"
orders = "sql_orders"
"#,
    )
    .expect("config");
    let mut repositories = config.repositories();
    repositories.sort();
    assert_eq!(
        repositories,
        vec![
            ("orders".to_string(), "sql_orders".to_string()),
            ("users".to_string(), "memory_users".to_string()),
        ]
    );
}

#[test]
fn single_listener_value_behaves_as_one_element_list() {
    let config = ConfigStore::from_str(
        r#"
[events]
"user.created" = "audit"
"order.created" = ["audit", "notify"]
"#,
    )
    .expect("config");
    let events = config.events();
    let user_created = events
        .iter()
        .find(|(name, _)| name == "user.created")
        .expect("user.created");
    assert_eq!(user_created.1, vec!["audit".to_string()]);

    let order_created = events
        .iter()
        .find(|(name, _)| name == "order.created")
        .expect("order.created");
    assert_eq!(
        order_created.1,
        vec!["audit".to_string(), "notify".to_string()]
    );
}
