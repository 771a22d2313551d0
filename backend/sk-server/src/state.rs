use sk_db::Database;
use sk_lifecycle::CancellationDomain;
use sk_telemetry::{Logger, Metrics};

use std::sync::Arc;
use std::time::Instant;

/// Who this process is, as reported by headers and diagnostics.
#[derive(Debug, Clone)]
pub struct ServiceIdentity {
    pub service: String,
    pub version: String,
    pub environment: String,
    pub started_at: Instant,
}

impl ServiceIdentity {
    pub fn new(service: &str, version: &str, environment: &str) -> Self {
        Self {
            service: service.to_string(),
            version: version.to_string(),
            environment: environment.to_string(),
            started_at: Instant::now(),
        }
    }

    /// Value of the `Server` response header
    pub fn server_header(&self) -> String {
        format!("{}/{}", self.service, self.version)
    }
}

/// Shared handler state for the API and diagnostics routers
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<dyn Database>,
    pub domain: CancellationDomain,
    pub identity: ServiceIdentity,
    pub logger: Logger,
    pub metrics: Metrics,
}
