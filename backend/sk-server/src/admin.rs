//! Administrative endpoints for process management.

use crate::state::AppState;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

pub const SHUTDOWN_ORIGIN: &str = "admin-endpoint";

#[derive(Debug, Serialize)]
pub struct ShutdownResponse {
    pub status: String,
    pub message: String,
}

/// POST /admin/shutdown - graceful shutdown through the cancellation domain.
///
/// The response is written before the API server drains, so the caller
/// always sees the 202.
pub async fn shutdown_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<ShutdownResponse>) {
    state
        .logger
        .info("Graceful shutdown requested via HTTP", &[]);

    state.domain.request_shutdown(SHUTDOWN_ORIGIN);

    (
        StatusCode::ACCEPTED,
        Json(ShutdownResponse {
            status: "shutting_down".to_string(),
            message: "Shutdown initiated".to_string(),
        }),
    )
}
