use crate::{
    API_ADDR_KEY, ConfigErrorResult, ConfigTree, DATABASE_PATH_KEY, DEFAULT_ENVIRONMENT,
    DatabaseConfig, Environment, LifecycleConfig, LoggingConfig, ServersConfig,
};

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub environment: Environment,
    pub servers: ServersConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub lifecycle: LifecycleConfig,
    tree: ConfigTree,
}

impl Config {
    /// Load config from the given file.
    ///
    /// Loading order:
    /// 1. Parse the TOML file (it must exist)
    /// 2. Check required keys (`servers.api.addr`, `database.path`)
    /// 3. Deserialize typed sections, missing sections use defaults
    /// 4. Apply SK_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load(path: impl AsRef<Path>) -> ConfigErrorResult<Self> {
        let tree = ConfigTree::from_file(path)?;
        let mut config = Self::from_tree(tree)?;

        config.apply_env_overrides();

        Ok(config)
    }

    /// Build typed config from an already parsed tree.
    pub fn from_tree(tree: ConfigTree) -> ConfigErrorResult<Self> {
        tree.get_string(API_ADDR_KEY)?;
        tree.get_string(DATABASE_PATH_KEY)?;

        let environment = tree
            .get_string_or("environment", DEFAULT_ENVIRONMENT)
            .parse()?;

        Ok(Self {
            environment,
            servers: tree.section("servers")?,
            database: tree.section("database")?,
            logging: tree.section("logging")?,
            lifecycle: tree.section("lifecycle")?,
            tree,
        })
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.servers.validate()?;
        self.database.validate()?;
        self.lifecycle.validate()?;

        Ok(())
    }

    /// Raw document for settings without a typed home.
    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }

    /// Log file path when file output is configured.
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.logging
            .file
            .as_ref()
            .map(|file| Path::new(&self.logging.dir).join(file))
    }

    /// Log configuration summary (NEVER logs secrets).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  environment: {}", self.environment);
        info!(
            "  api: {} (read {}, write {}, origin {})",
            self.servers.api.addr,
            fmt_duration(self.servers.api.read_timeout),
            fmt_duration(self.servers.api.write_timeout),
            self.servers.api.allow_origin
        );

        if self.servers.disable_auxiliary {
            info!("  auxiliary servers: disabled");
        } else {
            info!(
                "  metrics: {}, diagnostics: {}",
                self.servers.metrics_addr(),
                self.servers.diagnostics_addr()
            );
        }

        info!(
            "  database: {} (pool {}-{}, lifetime {}, error budget {})",
            self.database.path,
            self.database.min_connections,
            self.database.max_connections,
            fmt_duration(self.database.max_lifetime),
            self.database.error_budget
        );

        info!(
            "  logging: {} (colored: {}, file: {})",
            self.logging.level,
            self.logging.colored,
            self.logging.file.as_deref().unwrap_or("stdout")
        );

        info!(
            "  lifecycle: start {}, stop {}, forced close {}",
            fmt_duration(self.lifecycle.start_timeout),
            fmt_duration(self.lifecycle.stop_timeout),
            fmt_duration(self.lifecycle.forced_close_after)
        );
    }

    fn apply_env_overrides(&mut self) {
        Self::apply_env_parse("SK_ENVIRONMENT", &mut self.environment);

        // Servers
        Self::apply_env_string("SK_API_ADDR", &mut self.servers.api.addr);
        Self::apply_env_string("SK_API_ALLOW_ORIGIN", &mut self.servers.api.allow_origin);
        Self::apply_env_string("SK_METRICS_ADDR", &mut self.servers.metrics.addr);
        Self::apply_env_string("SK_DIAGNOSTICS_ADDR", &mut self.servers.diagnostics.addr);
        Self::apply_env_bool(
            "SK_DISABLE_AUX_SERVERS",
            &mut self.servers.disable_auxiliary,
        );

        // Database
        Self::apply_env_string("SK_DATABASE_PATH", &mut self.database.path);
        Self::apply_env_parse(
            "SK_DATABASE_MAX_CONNECTIONS",
            &mut self.database.max_connections,
        );
        Self::apply_env_parse(
            "SK_DATABASE_MIN_CONNECTIONS",
            &mut self.database.min_connections,
        );
        Self::apply_env_parse("SK_DATABASE_ERROR_BUDGET", &mut self.database.error_budget);
        Self::apply_env_duration(
            "SK_DATABASE_HEALTH_CHECK_INTERVAL",
            &mut self.database.health_check_interval,
        );

        // Logging
        Self::apply_env_parse("SK_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("SK_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("SK_LOG_FILE", &mut self.logging.file);

        // Lifecycle
        Self::apply_env_duration("SK_START_TIMEOUT", &mut self.lifecycle.start_timeout);
        Self::apply_env_duration("SK_STOP_TIMEOUT", &mut self.lifecycle.stop_timeout);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for humantime durations
    fn apply_env_duration(var_name: &str, target: &mut Duration) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = humantime::parse_duration(val.trim())
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}

fn fmt_duration(duration: Duration) -> humantime::FormattedDuration {
    humantime::format_duration(duration)
}
