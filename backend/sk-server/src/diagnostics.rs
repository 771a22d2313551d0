//! Runtime status for operators, served by the diagnostics server.

use crate::state::AppState;

use axum::{Json, extract::State};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
    pub pid: u32,
    pub shutting_down: bool,
    pub runtime: RuntimeStatus,
    pub database: DatabaseStatus,
}

#[derive(Debug, Serialize)]
pub struct RuntimeStatus {
    pub workers: usize,
    pub alive_tasks: usize,
    pub global_queue_depth: usize,
    pub domain_tasks: usize,
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub connections: u32,
    pub idle: u32,
    pub in_use: u32,
    pub max_connections: u32,
}

/// GET /debug/status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let runtime = tokio::runtime::Handle::current().metrics();
    let stats = state.database.stats();

    Json(StatusResponse {
        service: state.identity.service.clone(),
        version: state.identity.version.clone(),
        environment: state.identity.environment.clone(),
        uptime_seconds: state.identity.started_at.elapsed().as_secs(),
        pid: std::process::id(),
        shutting_down: state.domain.is_cancelled(),
        runtime: RuntimeStatus {
            workers: runtime.num_workers(),
            alive_tasks: runtime.num_alive_tasks(),
            global_queue_depth: runtime.global_queue_depth(),
            domain_tasks: state.domain.task_count(),
        },
        database: DatabaseStatus {
            connections: stats.size,
            idle: stats.idle,
            in_use: stats.in_use(),
            max_connections: stats.max_connections,
        },
    })
}
