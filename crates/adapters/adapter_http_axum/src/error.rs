//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use evsedash_domain::error::DeviceError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request body is missing, not JSON, or lacks a required field.
    BadRequest(String),
    /// The charger behind the API failed.
    Device(DeviceError),
}

impl From<DeviceError> for ApiError {
    fn from(err: DeviceError) -> Self {
        Self::Device(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Device(err @ DeviceError::Unavailable) => {
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            Self::Device(err) => {
                tracing::error!(error = %err, "charger error");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
