mod dispatch;
mod logger;

use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// A line captured from the `log` facade
#[derive(Debug, Clone)]
pub(crate) struct Captured {
    pub level: Level,
    pub message: String,
    pub file: Option<String>,
}

struct CaptureLogger {
    lines: Mutex<Vec<Captured>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.lines.lock().unwrap().push(Captured {
            level: record.level(),
            message: record.args().to_string(),
            file: record.file().map(str::to_string),
        });
    }

    fn flush(&self) {}
}

static CAPTURE: CaptureLogger = CaptureLogger {
    lines: Mutex::new(Vec::new()),
};
static INSTALL: Once = Once::new();

/// Install the capturing logger (once per test binary) and clear it.
/// Tests using it must be `#[serial]`.
pub(crate) fn capture() {
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
    });
    log::set_max_level(LevelFilter::Trace);
    CAPTURE.lines.lock().unwrap().clear();
}

pub(crate) fn captured() -> Vec<Captured> {
    CAPTURE.lines.lock().unwrap().clone()
}
