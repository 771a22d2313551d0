use std::fmt;

/// What ended the run. The first cause recorded on a domain wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownCause {
    /// OS signal, e.g. `SIGTERM`
    Signal(&'static str),
    /// Explicit request; carries the origin (`admin-endpoint`, ...)
    Requested(String),
    /// Unrecoverable failure; carries the reason
    Fatal(String),
}

impl ShutdownCause {
    pub fn kind(&self) -> &'static str {
        match self {
            ShutdownCause::Signal(_) => "signal",
            ShutdownCause::Requested(_) => "requested",
            ShutdownCause::Fatal(_) => "fatal",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ShutdownCause::Fatal(_))
    }
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownCause::Signal(name) => write!(f, "signal {}", name),
            ShutdownCause::Requested(origin) => write!(f, "requested by {}", origin),
            ShutdownCause::Fatal(reason) => write!(f, "fatal: {}", reason),
        }
    }
}
