use crate::{ServerError, ShutdownCause, TaskFailure};

use sk_telemetry::{Field, Logger};

/// Result of stopping one server
#[derive(Debug)]
pub struct StopOutcome {
    pub server: String,
    pub error: Option<ServerError>,
}

/// Everything that went wrong between the shutdown trigger and process exit.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Stop results in the order the servers were stopped
    pub entries: Vec<StopOutcome>,
    pub cause: Option<ShutdownCause>,
    pub task_failures: Vec<TaskFailure>,
    /// Tasks still running after the grace period
    pub aborted_tasks: usize,
    /// Set when startup never got past `Init`
    pub init_error: Option<String>,
}

impl ShutdownReport {
    pub fn init_failed(error: impl Into<String>, cause: Option<ShutdownCause>) -> Self {
        Self {
            init_error: Some(error.into()),
            cause,
            ..Self::default()
        }
    }

    pub fn stop_errors(&self) -> impl Iterator<Item = &ServerError> {
        self.entries.iter().filter_map(|entry| entry.error.as_ref())
    }

    pub fn is_clean(&self) -> bool {
        self.init_error.is_none()
            && !self.cause.as_ref().is_some_and(ShutdownCause::is_fatal)
            && self.task_failures.is_empty()
            && self.aborted_tasks == 0
            && self.stop_errors().next().is_none()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_clean() { 0 } else { 1 }
    }

    /// Per-server summary followed by one final status line.
    pub fn log(&self, logger: &Logger) {
        for entry in &self.entries {
            match &entry.error {
                None => logger.info("Server stopped", &[Field::server(entry.server.as_str())]),
                Some(e) => logger.error(
                    "Server stop failed",
                    &[Field::server(entry.server.as_str()), Field::error(e)],
                ),
            }
        }

        for failure in &self.task_failures {
            logger.error(
                "Task failure recorded",
                &[
                    Field::str("task", failure.task.as_str()),
                    Field::str("error", failure.error.as_str()),
                ],
            );
        }

        let mut fields = vec![
            Field::int("exit_code", self.exit_code() as i64),
            Field::uint("aborted_tasks", self.aborted_tasks as u64),
        ];
        if let Some(cause) = &self.cause {
            fields.push(Field::str("cause", cause.to_string()));
        }

        if let Some(init_error) = &self.init_error {
            fields.push(Field::str("init_error", init_error.as_str()));
            logger.fatal("Startup failed", &fields);
        } else if self.is_clean() {
            logger.info("Shutdown complete", &fields);
        } else {
            logger.error("Shutdown completed with errors", &fields);
        }
    }
}
