use crate::state::AppState;

use sk_telemetry::Field;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub alive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,
}

/// GET /health - liveness probe (the process answers)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        alive: true,
        ready: None,
    })
}

/// GET /ready - readiness probe (the database answers)
///
/// The ping outcome also feeds the error budget guard.
pub async fn readiness(State(state): State<AppState>) -> Response {
    match state.database.ping().await {
        Ok(()) => Json(HealthResponse {
            alive: true,
            ready: Some(true),
        })
        .into_response(),
        Err(e) => {
            state
                .logger
                .warn("Readiness check failed", &[Field::error(&e)]);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    alive: true,
                    ready: Some(false),
                }),
            )
                .into_response()
        }
    }
}

