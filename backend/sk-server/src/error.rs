use thiserror::Error;

/// Failures that stop the process before the lifecycle orchestrator takes over
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] sk_config::ConfigError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] sk_telemetry::TelemetryError),
}

pub type Result<T> = std::result::Result<T, AppError>;
