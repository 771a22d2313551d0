use std::panic::Location;
use std::path::PathBuf;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("{category} error: {message} {location}")]
    Generic {
        category: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Required config key '{key}' is missing {location}")]
    MissingKey {
        key: String,
        location: ErrorLocation,
    },

    #[error("Config key '{key}' has an invalid value (expected {expected}) {location}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        location: ErrorLocation,
    },
}

impl ConfigError {
    /// Create a config error
    #[track_caller]
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::generic("Config", message)
    }

    /// Create a database error
    #[track_caller]
    pub fn database<S: Into<String>>(message: S) -> Self {
        Self::generic("Database", message)
    }

    /// Create a server error
    #[track_caller]
    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::generic("Server", message)
    }

    /// Create a lifecycle error
    #[track_caller]
    pub fn lifecycle<S: Into<String>>(message: S) -> Self {
        Self::generic("Lifecycle", message)
    }

    #[track_caller]
    pub fn missing_key<S: Into<String>>(key: S) -> Self {
        ConfigError::MissingKey {
            key: key.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_value<S: Into<String>>(key: S, expected: &'static str) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            expected,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    fn generic<S: Into<String>>(category: &'static str, message: S) -> Self {
        ConfigError::Generic {
            category,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl serde::de::Error for ConfigError {
    #[track_caller]
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Self::generic("Serde", msg.to_string())
    }
}

pub type ConfigErrorResult<T> = StdResult<T, ConfigError>;
