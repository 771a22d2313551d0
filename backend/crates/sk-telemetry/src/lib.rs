mod dispatch;
mod error;
mod field;
mod logger;
mod metrics;

#[cfg(test)]
mod tests;

pub use dispatch::initialize;
pub use error::{TelemetryError, TelemetryErrorResult};
pub use field::{Field, FieldValue, encode};
pub use logger::Logger;
pub use metrics::{Metrics, install_recorder};
