use std::panic::Location;
use std::result::Result as StdResult;
use std::time::Duration;

use error_location::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ServerError {
    #[error("{server}: failed to bind {addr}: {source} {location}")]
    Bind {
        server: String,
        addr: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("{server}: serve loop failed: {source} {location}")]
    Serve {
        server: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("{server}: already started {location}")]
    AlreadyStarted {
        server: String,
        location: ErrorLocation,
    },

    #[error("{server}: connections still open after {} {location}", humantime::format_duration(*.timeout))]
    DrainTimeout {
        server: String,
        timeout: Duration,
        location: ErrorLocation,
    },

    #[error("{server}: close failed: {message} {location}")]
    Close {
        server: String,
        message: String,
        location: ErrorLocation,
    },
}

impl ServerError {
    #[track_caller]
    pub fn bind(server: &str, addr: &str, source: std::io::Error) -> Self {
        Self::Bind {
            server: server.to_string(),
            addr: addr.to_string(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn serve(server: &str, source: std::io::Error) -> Self {
        Self::Serve {
            server: server.to_string(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn already_started(server: &str) -> Self {
        Self::AlreadyStarted {
            server: server.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn drain_timeout(server: &str, timeout: Duration) -> Self {
        Self::DrainTimeout {
            server: server.to_string(),
            timeout,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn close<S: Into<String>>(server: &str, message: S) -> Self {
        Self::Close {
            server: server.to_string(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type ServerErrorResult<T> = StdResult<T, ServerError>;
