mod config;
mod config_tree;
mod database_config;
mod duration;
mod environment;
mod error;
mod lifecycle_config;
mod log_level;
mod logging_config;
mod servers_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use config_tree::ConfigTree;
pub use database_config::DatabaseConfig;
pub use environment::Environment;
pub use error::{ConfigError, ConfigErrorResult};
pub use lifecycle_config::LifecycleConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use servers_config::{ApiServerConfig, AuxServerConfig, ServersConfig};

use std::time::Duration;

pub const APP_NAME: &str = "service-skeleton";
pub const DEFAULT_CONFIG_PATH: &str = "config.conf";

// Keys that must be present in the config file
pub const API_ADDR_KEY: &str = "servers.api.addr";
pub const DATABASE_PATH_KEY: &str = "database.path";

const DEFAULT_ENVIRONMENT: &str = "production";

const DEFAULT_API_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:9090";
const DEFAULT_DIAGNOSTICS_ADDR: &str = "127.0.0.1:6060";
const DEFAULT_ALLOW_ORIGIN: &str = "*";
const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_AUX_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_DATABASE_PATH: &str = "skeleton.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_MIN_CONNECTIONS: u32 = 10;
const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(60 * 60);
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_SLOW_STATEMENT_THRESHOLD: Duration = Duration::from_secs(30);
const DEFAULT_ERROR_BUDGET: u32 = 5;
const DEFAULT_HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(15);

const MIN_MAX_CONNECTIONS: u32 = 1;
const MAX_MAX_CONNECTIONS: u32 = 1000;
const MIN_ERROR_BUDGET: u32 = 1;
const MAX_ERROR_BUDGET: u32 = 1000;

const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";

const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_FORCED_CLOSE_AFTER: Duration = Duration::from_secs(3);
const DEFAULT_TASK_GRACE: Duration = Duration::from_secs(5);
