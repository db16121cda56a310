#[derive(Clone, Debug)]
pub struct StaticConfigItem {
    pub key: &'static str,
    pub description: &'static str,
    pub value_type: &'static str,
    pub default_value: &'static str,
}

pub static STATIC_CONFIG_TABLE: &[StaticConfigItem] = &[
    StaticConfigItem {
        key: "install.marker_path",
        description: "Sentinel file whose presence marks first-time installation as done",
        value_type: "string",
        default_value: ".chassis-installed",
    },
    StaticConfigItem {
        key: "install.config_path",
        description: "User config file published from the package template on first run",
        value_type: "string",
        default_value: "chassis.toml",
    },
    StaticConfigItem {
        key: "database.driver",
        description: "Storage driver name (mysql family or a document driver)",
        value_type: "string",
        default_value: "sqlite",
    },
    StaticConfigItem {
        key: "database.migrations_path",
        description: "Directory of pending migrations applied on first install",
        value_type: "string",
        default_value: "migrations",
    },
];

pub fn config_item(key: &str) -> Option<&'static StaticConfigItem> {
    STATIC_CONFIG_TABLE.iter().find(|item| item.key == key)
}

pub fn default_value(key: &str) -> Option<String> {
    config_item(key).map(|item| item.default_value.to_string())
}
