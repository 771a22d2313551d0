use crate::field::{Field, encode};

use std::fmt::Display;
use std::panic::Location;
use std::sync::Arc;

use log::{Level, Record};

const LOG_TARGET: &str = "sk";

/// Process-scoped leveled logger carrying base fields.
///
/// Cheap to clone. Child loggers created with [`Logger::with`] append their
/// fields after the parent's. Output goes through the `log` facade, so the
/// fern dispatch installed at startup decides where lines end up.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    base: Arc<Vec<Field>>,
}

impl Logger {
    pub fn new(base: Vec<Field>) -> Self {
        Self {
            base: Arc::new(base),
        }
    }

    /// Logger tagged with `env`, `version` and `service`.
    pub fn for_service(service: &str, version: &str, env: &str) -> Self {
        Self::new(vec![
            Field::env(env),
            Field::version(version),
            Field::service(service),
        ])
    }

    pub fn with(&self, fields: Vec<Field>) -> Self {
        let mut base = Vec::with_capacity(self.base.len() + fields.len());
        base.extend(self.base.iter().cloned());
        base.extend(fields);
        Self {
            base: Arc::new(base),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.base
    }

    #[track_caller]
    pub fn debug(&self, message: &str, fields: &[Field]) {
        self.emit(Level::Debug, message, fields, false);
    }

    #[track_caller]
    pub fn info(&self, message: &str, fields: &[Field]) {
        self.emit(Level::Info, message, fields, false);
    }

    #[track_caller]
    pub fn warn(&self, message: &str, fields: &[Field]) {
        self.emit(Level::Warn, message, fields, false);
    }

    #[track_caller]
    pub fn error(&self, message: &str, fields: &[Field]) {
        self.emit(Level::Error, message, fields, false);
    }

    /// Logs at error level tagged `fatal=true`. Never exits; the caller
    /// decides what happens to the process.
    #[track_caller]
    pub fn fatal(&self, message: &str, fields: &[Field]) {
        self.emit(Level::Error, message, fields, true);
    }

    /// Log `message` at error level with the error attached. No-op on `Ok`.
    #[track_caller]
    pub fn log_if_error<T, E>(&self, message: &str, result: &Result<T, E>, fields: &[Field])
    where
        E: std::error::Error,
    {
        if let Err(e) = result {
            let mut all = fields.to_vec();
            all.push(Field::error(e));
            self.emit(Level::Error, message, &all, false);
        }
    }

    #[track_caller]
    fn emit(&self, level: Level, message: &str, fields: &[Field], fatal: bool) {
        if level <= Level::Warn {
            metrics::counter!("logs_total", "level" => level_label(level, fatal)).increment(1);
        }

        if level > log::max_level() {
            return;
        }

        let mut all = Vec::with_capacity(self.base.len() + fields.len() + 1);
        all.extend_from_slice(fields);
        all.extend(self.base.iter().cloned());
        if fatal {
            all.push(Field::bool("fatal", true));
        }

        let line = Line {
            message,
            fields: encode(&all),
        };
        let location = Location::caller();

        log::logger().log(
            &Record::builder()
                .args(format_args!("{}", line))
                .level(level)
                .target(LOG_TARGET)
                .file_static(Some(location.file()))
                .line(Some(location.line()))
                .build(),
        );
    }
}

struct Line<'a> {
    message: &'a str,
    fields: String,
}

impl Display for Line<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.fields.is_empty() {
            f.write_str(self.message)
        } else {
            write!(f, "{} {}", self.message, self.fields)
        }
    }
}

fn level_label(level: Level, fatal: bool) -> &'static str {
    match level {
        _ if fatal => "fatal",
        Level::Error => "error",
        Level::Warn => "warn",
        Level::Info => "info",
        Level::Debug => "debug",
        Level::Trace => "trace",
    }
}
