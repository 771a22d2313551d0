use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_FORCED_CLOSE_AFTER, DEFAULT_START_TIMEOUT,
    DEFAULT_STOP_TIMEOUT, DEFAULT_TASK_GRACE,
};

use std::time::Duration;

use serde::Deserialize;

/// Start/stop deadlines for the process lifecycle.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Bound on init (connect + migrate) and server startup
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub start_timeout: Duration,
    /// Bound on graceful drain of the API server
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub stop_timeout: Duration,
    /// Wait after cancellation before a server's listener is dropped
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub forced_close_after: Duration,
    /// Wait for background tasks after cancellation before aborting them
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub task_grace: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            start_timeout: DEFAULT_START_TIMEOUT,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            forced_close_after: DEFAULT_FORCED_CLOSE_AFTER,
            task_grace: DEFAULT_TASK_GRACE,
        }
    }
}

impl LifecycleConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let fields = [
            ("lifecycle.start_timeout", self.start_timeout),
            ("lifecycle.stop_timeout", self.stop_timeout),
            ("lifecycle.forced_close_after", self.forced_close_after),
            ("lifecycle.task_grace", self.task_grace),
        ];

        for (key, value) in fields {
            if value.is_zero() {
                return Err(ConfigError::lifecycle(format!(
                    "{} must be greater than zero",
                    key
                )));
            }
        }

        // Auxiliary servers are still inside their forced-close wait until
        // `forced_close_after` elapses; a shorter grace aborts them.
        if self.task_grace <= self.forced_close_after {
            return Err(ConfigError::lifecycle(format!(
                "lifecycle.task_grace ({}) must be longer than lifecycle.forced_close_after ({})",
                humantime::format_duration(self.task_grace),
                humantime::format_duration(self.forced_close_after)
            )));
        }

        Ok(())
    }
}
