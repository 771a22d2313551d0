use crate::api::error;
use crate::middleware::{HttpMetrics, request_id, server_header, track_metrics};
use crate::state::AppState;
use crate::{admin, diagnostics, health};

use sk_config::{ApiServerConfig, AuxServerConfig};
use sk_telemetry::{Field, Logger};

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, StatusCode},
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};

pub const API_SERVER: &str = "api";
pub const METRICS_SERVER: &str = "metrics";
pub const DIAGNOSTICS_SERVER: &str = "diagnostics";

/// Build the public API router
pub fn build_api_router(state: AppState, config: &ApiServerConfig) -> Router {
    let cors = cors_layer(&config.allow_origin, &state.logger);

    let router = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .route("/admin/shutdown", post(admin::shutdown_handler))
        .fallback(error::not_found)
        .method_not_allowed_fallback(error::method_not_allowed)
        .with_state(state.clone())
        .layer(cors);

    with_common_layers(
        router,
        API_SERVER,
        &state,
        config.read_timeout,
        config.write_timeout,
    )
}

/// Build the Prometheus exposition router
pub fn build_metrics_router(
    handle: PrometheusHandle,
    state: &AppState,
    config: &AuxServerConfig,
) -> Router {
    let router = Router::new()
        .route(
            "/metrics",
            get(move || std::future::ready(handle.render())),
        )
        .fallback(error::not_found);

    with_common_layers(
        router,
        METRICS_SERVER,
        state,
        config.read_timeout,
        config.write_timeout,
    )
}

/// Build the diagnostics router
pub fn build_diagnostics_router(state: AppState, config: &AuxServerConfig) -> Router {
    let router = Router::new()
        .route("/debug/status", get(diagnostics::status))
        .fallback(error::not_found)
        .with_state(state.clone());

    with_common_layers(
        router,
        DIAGNOSTICS_SERVER,
        &state,
        config.read_timeout,
        config.write_timeout,
    )
}

/// Timeouts, metrics, `Server` header and request id, outermost last
fn with_common_layers(
    router: Router,
    server: &'static str,
    state: &AppState,
    read_timeout: Duration,
    write_timeout: Duration,
) -> Router {
    let http_metrics = HttpMetrics {
        server,
        metrics: state.metrics.clone(),
    };

    router
        .layer(RequestBodyTimeoutLayer::new(read_timeout))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            write_timeout,
        ))
        .layer(middleware::from_fn_with_state(http_metrics, track_metrics))
        .layer(middleware::from_fn_with_state(
            state.identity.clone(),
            server_header,
        ))
        .layer(middleware::from_fn(request_id))
}

fn cors_layer(allow_origin: &str, logger: &Logger) -> CorsLayer {
    let origin = if allow_origin == "*" {
        AllowOrigin::from(Any)
    } else {
        match HeaderValue::from_str(allow_origin) {
            Ok(value) => AllowOrigin::list([value]),
            Err(_) => {
                logger.warn(
                    "Invalid CORS origin, cross-origin requests will be refused",
                    &[Field::str("origin", allow_origin)],
                );
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
