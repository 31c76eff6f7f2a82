//! JSON REST handlers for charger settings.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use evsedash_app::ports::DeviceApi;
use evsedash_domain::settings::DeviceSettings;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<DeviceSettings>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the update endpoint.
pub enum UpdateResponse {
    /// Echoes what the charger stored, which may differ from the request.
    Created(Json<DeviceSettings>),
}

impl IntoResponse for UpdateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/v1/settings`
pub async fn get<D: DeviceApi + 'static>(
    State(state): State<AppState<D>>,
) -> Result<GetResponse, ApiError> {
    let settings = state.charger.fetch_settings().await?;
    Ok(GetResponse::Ok(Json(settings)))
}

/// `POST /api/v1/settings`
pub async fn update<D: DeviceApi + 'static>(
    State(state): State<AppState<D>>,
    body: Result<Json<DeviceSettings>, JsonRejection>,
) -> Result<UpdateResponse, ApiError> {
    let Json(settings) = body?;
    state.charger.write_settings(&settings).await?;
    let stored = state.charger.fetch_settings().await?;
    Ok(UpdateResponse::Created(Json(stored)))
}
