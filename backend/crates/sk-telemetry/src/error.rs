use std::panic::Location;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum TelemetryError {
    #[error("Logger error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    #[error("Metrics recorder error: {message} {location}")]
    Recorder {
        message: String,
        location: ErrorLocation,
    },
}

impl TelemetryError {
    #[track_caller]
    pub fn logger<S: Into<String>>(message: S) -> Self {
        TelemetryError::Logger {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn recorder<S: Into<String>>(message: S) -> Self {
        TelemetryError::Recorder {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type TelemetryErrorResult<T> = StdResult<T, TelemetryError>;
