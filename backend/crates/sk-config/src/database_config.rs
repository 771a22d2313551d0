use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_BUSY_TIMEOUT, DEFAULT_DATABASE_PATH,
    DEFAULT_ERROR_BUDGET, DEFAULT_HEALTH_CHECK_INTERVAL, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MAX_LIFETIME, DEFAULT_MIN_CONNECTIONS, DEFAULT_SLOW_STATEMENT_THRESHOLD,
    MAX_ERROR_BUDGET, MAX_MAX_CONNECTIONS, MIN_ERROR_BUDGET, MIN_MAX_CONNECTIONS,
};

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: String,
    /// Maximum open connections in the pool
    pub max_connections: u32,
    /// Connections kept idle in the pool
    pub min_connections: u32,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub max_lifetime: Duration,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub busy_timeout: Duration,
    /// Statements slower than this are logged at warn
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub slow_statement_threshold: Duration,
    /// Consecutive failures tolerated before the process shuts down
    pub error_budget: u32,
    /// Background ping interval; zero disables the watcher
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub health_check_interval: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: String::from(DEFAULT_DATABASE_PATH),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            max_lifetime: DEFAULT_MAX_LIFETIME,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            slow_statement_threshold: DEFAULT_SLOW_STATEMENT_THRESHOLD,
            error_budget: DEFAULT_ERROR_BUDGET,
            health_check_interval: DEFAULT_HEALTH_CHECK_INTERVAL,
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::database("database.path must not be empty"));
        }

        if self.max_connections < MIN_MAX_CONNECTIONS || self.max_connections > MAX_MAX_CONNECTIONS
        {
            return Err(ConfigError::database(format!(
                "database.max_connections must be {}-{}, got {}",
                MIN_MAX_CONNECTIONS, MAX_MAX_CONNECTIONS, self.max_connections
            )));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::database(format!(
                "database.min_connections ({}) cannot exceed database.max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }

        if self.max_lifetime.is_zero() {
            return Err(ConfigError::database(
                "database.max_lifetime must be greater than zero",
            ));
        }

        if self.error_budget < MIN_ERROR_BUDGET || self.error_budget > MAX_ERROR_BUDGET {
            return Err(ConfigError::database(format!(
                "database.error_budget must be {}-{}, got {}",
                MIN_ERROR_BUDGET, MAX_ERROR_BUDGET, self.error_budget
            )));
        }

        Ok(())
    }
}
