//! `GET /api/v1/state`

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use evsedash_app::ports::DeviceApi;
use evsedash_domain::state::DeviceState;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the state endpoint.
pub enum GetResponse {
    Ok(Json<DeviceState>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/v1/state`
pub async fn get<D: DeviceApi + 'static>(
    State(state): State<AppState<D>>,
) -> Result<GetResponse, ApiError> {
    let device_state = state.charger.fetch_state().await?;
    Ok(GetResponse::Ok(Json(device_state)))
}
