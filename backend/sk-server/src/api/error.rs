//! REST API error types
//!
//! Errors render as RFC 7807 problem documents
//! (`application/problem+json`).

use std::panic::Location;

use axum::{
    Json,
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// RFC 7807 problem details body
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub instance: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// No route matches (404)
    #[error("Route not found: {path} {location}")]
    NotFound {
        path: String,
        location: ErrorLocation,
    },

    /// Route exists but not for this method (405)
    #[error("Method {method} not allowed on {path} {location}")]
    MethodNotAllowed {
        method: String,
        path: String,
        location: ErrorLocation,
    },
}

impl ApiError {
    #[track_caller]
    pub fn not_found(path: impl Into<String>) -> Self {
        ApiError::NotFound {
            path: path.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn method_not_allowed(method: impl Into<String>, path: impl Into<String>) -> Self {
        ApiError::MethodNotAllowed {
            method: method.into(),
            path: path.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::debug!("{}", self);

        let status = self.status();
        let (detail, instance) = match self {
            ApiError::NotFound { path, .. } => (None, path),
            ApiError::MethodNotAllowed { method, path, .. } => {
                (Some(format!("{} is not supported here", method)), path)
            }
        };

        let body = ProblemDetails {
            problem_type: "about:blank".to_string(),
            title: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            status: status.as_u16(),
            detail,
            instance,
        };

        (
            status,
            [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)],
            Json(body),
        )
            .into_response()
    }
}

/// Router fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}

/// Router fallback for known routes hit with the wrong method
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::method_not_allowed(method.as_str(), uri.path())
}
