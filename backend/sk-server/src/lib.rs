pub mod admin;
pub mod api;
pub mod app;
pub mod cli;
pub mod db_monitor;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod middleware;
pub mod routes;
pub mod servers;
pub mod state;

#[cfg(test)]
mod tests;

pub use api::error::ApiError;
pub use app::run;
pub use cli::Cli;
pub use db_monitor::DatabaseMonitor;
pub use error::{AppError, Result};
pub use routes::{build_api_router, build_diagnostics_router, build_metrics_router};
pub use servers::http_server::HttpServer;
pub use state::{AppState, ServiceIdentity};
