use crate::{TelemetryError, TelemetryErrorResult};

use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

/// Install the Prometheus recorder as the global `metrics` recorder.
/// The returned handle renders the exposition text for `/metrics`.
pub fn install_recorder() -> TelemetryErrorResult<PrometheusHandle> {
    PrometheusBuilder::new()
        .set_buckets(LATENCY_BUCKETS)
        .map_err(|e| TelemetryError::recorder(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::recorder(e.to_string()))
}

/// Metrics collector for the service process
#[derive(Debug, Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    /// Record one served HTTP request
    pub fn http_request(
        &self,
        server: &str,
        method: &str,
        path: &str,
        status: u16,
        latency: Duration,
    ) {
        let labels = [
            ("server", server.to_string()),
            ("method", method.to_string()),
            ("path", path.to_string()),
            ("status", status.to_string()),
        ];

        counter!(format!("{}_http_requests_total", self.prefix), &labels).increment(1);
        histogram!(
            format!("{}_http_requests_duration_seconds", self.prefix),
            &labels
        )
        .record(latency.as_secs_f64());
    }

    /// Record a managed server state transition
    pub fn server_state_changed(&self, server: &str, state: &'static str) {
        counter!(
            format!("{}_server_state_changes_total", self.prefix),
            "server" => server.to_string(),
            "state" => state
        )
        .increment(1);

        let up = if state == "running" { 1.0 } else { 0.0 };
        gauge!(format!("{}_server_up", self.prefix), "server" => server.to_string()).set(up);
    }

    /// Record a lifecycle phase change (`init`, `starting`, ...)
    pub fn lifecycle_state(&self, state: &'static str) {
        counter!(
            format!("{}_lifecycle_transitions_total", self.prefix),
            "state" => state
        )
        .increment(1);
    }

    /// Record a database failure reported to the error budget
    pub fn db_failure_reported(&self, consecutive: u32) {
        counter!(format!("{}_db_failures_total", self.prefix)).increment(1);
        gauge!(format!("{}_db_consecutive_failures", self.prefix)).set(consecutive as f64);
    }

    /// Record a successful database round trip
    pub fn db_success_reported(&self) {
        gauge!(format!("{}_db_consecutive_failures", self.prefix)).set(0.0);
    }

    /// Record the error budget being exhausted
    pub fn db_budget_tripped(&self) {
        counter!(format!("{}_db_budget_trips_total", self.prefix)).increment(1);
    }

    /// Publish connection pool occupancy
    pub fn pool_stats(&self, size: u32, idle: u32, max: u32) {
        gauge!(format!("{}_db_pool_connections", self.prefix)).set(size as f64);
        gauge!(format!("{}_db_pool_idle", self.prefix)).set(idle as f64);
        gauge!(format!("{}_db_pool_max", self.prefix)).set(max as f64);
    }

    /// Record what ended the process
    pub fn shutdown_cause(&self, cause: &'static str) {
        counter!(format!("{}_shutdowns_total", self.prefix), "cause" => cause).increment(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new("sk")
    }
}
