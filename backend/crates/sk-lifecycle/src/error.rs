use crate::ServerError;

use std::panic::Location;
use std::result::Result as StdResult;
use std::time::Duration;

use error_location::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum LifecycleError {
    #[error("Initialization failed: {message} {location}")]
    Init {
        message: String,
        location: ErrorLocation,
    },

    #[error("Initialization did not finish within {} {location}", humantime::format_duration(*.timeout))]
    InitTimeout {
        timeout: Duration,
        location: ErrorLocation,
    },

    #[error("Failed to install signal handler: {source} {location}")]
    Signal {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Task failed: {message} {location}")]
    Task {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl LifecycleError {
    #[track_caller]
    pub fn init<S: Into<String>>(message: S) -> Self {
        Self::Init {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn signal(source: std::io::Error) -> Self {
        Self::Signal {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn task<S: Into<String>>(message: S) -> Self {
        Self::Task {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}


pub type LifecycleErrorResult<T> = StdResult<T, LifecycleError>;
