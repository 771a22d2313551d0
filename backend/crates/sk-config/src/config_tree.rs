use crate::{ConfigError, ConfigErrorResult};

use std::path::Path;
use std::time::Duration;

use log::warn;
use serde::de::DeserializeOwned;
use toml::{Table, Value};

/// Parsed configuration document with dotted-path lookup.
///
/// Strict getters (`get_*`) fail when the key is absent or has the wrong
/// type. The `*_or` variants fall back to the supplied default; a present
/// but mistyped value also falls back, with a warning.
#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    root: Table,
}

impl ConfigTree {
    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigErrorResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let root = toml::from_str::<Table>(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self { root })
    }

    pub fn from_table(root: Table) -> Self {
        Self { root }
    }

    /// Look up a value by dotted path, e.g. `servers.api.addr`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;

        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }

        Some(current)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    #[track_caller]
    pub fn get_string(&self, path: &str) -> ConfigErrorResult<String> {
        match self.require(path)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(ConfigError::invalid_value(path, "string")),
        }
    }

    #[track_caller]
    pub fn get_int(&self, path: &str) -> ConfigErrorResult<i64> {
        match self.require(path)? {
            Value::Integer(i) => Ok(*i),
            _ => Err(ConfigError::invalid_value(path, "integer")),
        }
    }

    #[track_caller]
    pub fn get_bool(&self, path: &str) -> ConfigErrorResult<bool> {
        match self.require(path)? {
            Value::Boolean(b) => Ok(*b),
            _ => Err(ConfigError::invalid_value(path, "boolean")),
        }
    }

    /// Durations are humantime strings ("30s", "5m"); bare integers are seconds.
    #[track_caller]
    pub fn get_duration(&self, path: &str) -> ConfigErrorResult<Duration> {
        match self.require(path)? {
            Value::String(s) => humantime::parse_duration(s.trim())
                .map_err(|_| ConfigError::invalid_value(path, "duration")),
            Value::Integer(secs) if *secs >= 0 => Ok(Duration::from_secs(*secs as u64)),
            _ => Err(ConfigError::invalid_value(path, "duration")),
        }
    }

    #[track_caller]
    pub fn get_string_list(&self, path: &str) -> ConfigErrorResult<Vec<String>> {
        let Value::Array(items) = self.require(path)? else {
            return Err(ConfigError::invalid_value(path, "list of strings"));
        };

        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(ConfigError::invalid_value(path, "list of strings")),
            })
            .collect()
    }

    pub fn get_string_or(&self, path: &str, default: &str) -> String {
        self.or_default(path, self.get_string(path), default.to_string())
    }

    pub fn get_int_or(&self, path: &str, default: i64) -> i64 {
        self.or_default(path, self.get_int(path), default)
    }

    pub fn get_bool_or(&self, path: &str, default: bool) -> bool {
        self.or_default(path, self.get_bool(path), default)
    }

    pub fn get_duration_or(&self, path: &str, default: Duration) -> Duration {
        self.or_default(path, self.get_duration(path), default)
    }

    pub fn get_string_list_or(&self, path: &str, default: &[&str]) -> Vec<String> {
        let fallback = default.iter().map(|s| s.to_string()).collect();
        self.or_default(path, self.get_string_list(path), fallback)
    }

    /// Deserialize the table at `path` into a typed section.
    /// A missing table yields the section's defaults.
    pub fn section<T>(&self, path: &str) -> ConfigErrorResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.lookup(path) {
            Some(value) => value.clone().try_into().map_err(|e: toml::de::Error| {
                ConfigError::config(format!("invalid [{}] section: {}", path, e.message()))
            }),
            None => Ok(T::default()),
        }
    }

    #[track_caller]
    fn require(&self, path: &str) -> ConfigErrorResult<&Value> {
        self.lookup(path)
            .ok_or_else(|| ConfigError::missing_key(path))
    }

    fn or_default<T>(&self, path: &str, result: ConfigErrorResult<T>, default: T) -> T {
        match result {
            Ok(value) => value,
            Err(ConfigError::MissingKey { .. }) => default,
            Err(e) => {
                warn!("Ignoring config key '{}', using default: {}", path, e);
                default
            }
        }
    }
}
