use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;
use toml::Value;

use crate::static_config::default_value;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config io error for {path}: {message}")]
    Io { path: String, message: String },
}

/// Parsed once at startup, read-only afterwards. Missing keys are answered
/// by defaults, never by errors; only a malformed source is fatal.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    root: Value,
}

impl ConfigStore {
    pub fn from_str(input: &str) -> Result<Self, ConfigError> {
        let root: Value =
            toml::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Ok(Self { root })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_str(&raw)
    }

    pub fn empty() -> Self {
        Self {
            root: Value::Table(toml::map::Map::new()),
        }
    }

    /// Dotted-path lookup. `None` when any segment is absent or an
    /// intermediate segment is not a table.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in key.split('.') {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key)
            .cloned()
            .and_then(|value| value.try_into::<T>().ok())
            .unwrap_or(default)
    }

    pub fn get_string(&self, key: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| default_value(key))
            .unwrap_or_default()
    }

    pub fn get_number(&self, key: &str) -> i64 {
        self.get(key)
            .and_then(Value::as_integer)
            .or_else(|| default_value(key).and_then(|value| value.parse::<i64>().ok()))
            .unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .and_then(Value::as_bool)
            .or_else(|| default_value(key).and_then(|value| parse_bool(&value)))
            .unwrap_or(false)
    }

    /// `[repositories]`: logical name -> implementation id.
    pub fn repositories(&self) -> Vec<(String, String)> {
        self.string_section("repositories")
    }

    /// `[events]`: event name -> listener ids. A bare string value behaves
    /// as a one-element list.
    pub fn events(&self) -> Vec<(String, Vec<String>)> {
        let Some(table) = self.get("events").and_then(Value::as_table) else {
            return Vec::new();
        };
        table
            .iter()
            .map(|(name, value)| (name.clone(), normalize_listeners(value)))
            .collect()
    }

    /// `[extensions]`: target surface id -> behavior set id.
    pub fn behavior_sets(&self) -> Vec<(String, String)> {
        self.string_section("extensions")
    }

    fn string_section(&self, section: &str) -> Vec<(String, String)> {
        let Some(table) = self.get(section).and_then(Value::as_table) else {
            return Vec::new();
        };
        table
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_str()
                    .map(|entry| (key.clone(), entry.to_string()))
            })
            .collect()
    }
}

fn normalize_listeners(value: &Value) -> Vec<String> {
    match value {
        Value::String(single) => vec![single.clone()],
        Value::Array(list) => list
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
