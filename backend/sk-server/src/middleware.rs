//! Request middleware shared by all three servers.

use crate::state::ServiceIdentity;

use sk_telemetry::Metrics;

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{HeaderName, HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Path label for requests that matched no route
const UNMATCHED_PATH: &str = "<unmatched>";

/// Request id attached to the request extensions by [`request_id`]
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// State for [`track_metrics`]: which server the requests belong to
#[derive(Debug, Clone)]
pub struct HttpMetrics {
    pub server: &'static str,
    pub metrics: Metrics,
}

/// Reuse the caller's `X-Request-Id` or mint a UUID v4, and echo it back.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Stamp `Server: <service>/<version>` on every response.
pub async fn server_header(
    State(identity): State<ServiceIdentity>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&identity.server_header()) {
        response.headers_mut().insert(header::SERVER, value);
    }
    response
}

/// Record request count and latency labelled by method, route and status.
pub async fn track_metrics(
    State(http): State<HttpMetrics>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();

    // Route template rather than the raw path
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());
    let method = req.method().clone();

    let response = next.run(req).await;

    http.metrics.http_request(
        http.server,
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}
