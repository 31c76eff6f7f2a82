//! `POST /api/v1/restart`

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use evsedash_app::ports::DeviceApi;
use evsedash_domain::restart::RestartRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for a restart. `time` is required; the firmware answers `400`
/// without it.
#[derive(Deserialize)]
pub struct RestartBody {
    /// Delay before rebooting, in milliseconds.
    pub time: Option<u64>,
}

/// Possible responses from the restart endpoint.
pub enum RestartResponse {
    Created,
}

impl IntoResponse for RestartResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created => StatusCode::CREATED.into_response(),
        }
    }
}

/// `POST /api/v1/restart`
pub async fn request<D: DeviceApi + 'static>(
    State(state): State<AppState<D>>,
    body: Result<Json<RestartBody>, JsonRejection>,
) -> Result<RestartResponse, ApiError> {
    let Json(body) = body?;
    let time = body
        .time
        .ok_or_else(|| ApiError::BadRequest("missing `time` field".to_string()))?;

    state.charger.request_restart(RestartRequest { time }).await?;
    Ok(RestartResponse::Created)
}
