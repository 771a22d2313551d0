use super::{FakeDatabase, TEST_VERSION, test_state};
use crate::build_api_router;
use crate::middleware::REQUEST_ID_HEADER;

use sk_config::ApiServerConfig;

use std::time::Duration;

use axum::body::Body;
use googletest::prelude::*;
use http::{Request, StatusCode, header};
use tower::ServiceExt;
use uuid::Uuid;

fn api_config(allow_origin: &str) -> ApiServerConfig {
    ApiServerConfig {
        allow_origin: allow_origin.to_string(),
        ..ApiServerConfig::default()
    }
}

#[tokio::test]
async fn given_request_without_id_when_served_then_uuid_request_id_returned() {
    // Given
    let router = build_api_router(test_state(FakeDatabase::healthy()), &api_config("*"));
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    // When
    let response = router.oneshot(request).await.unwrap();

    // Then
    let id = response.headers()[&REQUEST_ID_HEADER].to_str().unwrap();
    assert_that!(Uuid::parse_str(id).is_ok(), eq(true));
}

#[tokio::test]
async fn given_request_with_id_when_served_then_same_id_echoed() {
    // Given
    let router = build_api_router(test_state(FakeDatabase::healthy()), &api_config("*"));
    let request = Request::builder()
        .uri("/health")
        .header(&REQUEST_ID_HEADER, "trace-42")
        .body(Body::empty())
        .unwrap();

    // When
    let response = router.oneshot(request).await.unwrap();

    // Then
    assert_that!(
        response.headers()[&REQUEST_ID_HEADER].to_str().unwrap(),
        eq("trace-42")
    );
}

#[tokio::test]
async fn given_any_response_when_served_then_server_header_names_service_and_version() {
    // Given
    let router = build_api_router(test_state(FakeDatabase::healthy()), &api_config("*"));
    let request = Request::builder()
        .uri("/not-a-route")
        .body(Body::empty())
        .unwrap();

    // When
    let response = router.oneshot(request).await.unwrap();

    // Then
    let expected = format!("service-skeleton/{}", TEST_VERSION);
    assert_that!(
        response.headers()[header::SERVER].to_str().unwrap(),
        eq(expected.as_str())
    );
}

#[tokio::test]
async fn given_configured_origin_when_cross_origin_request_then_origin_allowed() {
    // Given
    let router = build_api_router(
        test_state(FakeDatabase::healthy()),
        &api_config("https://console.example.com"),
    );
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://console.example.com")
        .body(Body::empty())
        .unwrap();

    // When
    let response = router.oneshot(request).await.unwrap();

    // Then
    assert_that!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN]
            .to_str()
            .unwrap(),
        eq("https://console.example.com")
    );
}

#[tokio::test]
async fn given_configured_origin_when_other_origin_requests_then_no_allow_header() {
    // Given
    let router = build_api_router(
        test_state(FakeDatabase::healthy()),
        &api_config("https://console.example.com"),
    );
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://evil.example.com")
        .body(Body::empty())
        .unwrap();

    // When
    let response = router.oneshot(request).await.unwrap();

    // Then
    assert_that!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        eq(false)
    );
}

#[tokio::test]
async fn given_handler_slower_than_write_timeout_when_served_then_request_timeout() {
    // Given
    let config = ApiServerConfig {
        write_timeout: Duration::from_millis(50),
        ..api_config("*")
    };
    let state = test_state(FakeDatabase::slow(Duration::from_secs(2)));
    let router = build_api_router(state, &config);
    let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();

    // When
    let response = router.oneshot(request).await.unwrap();

    // Then
    assert_that!(response.status(), eq(StatusCode::REQUEST_TIMEOUT));
}
