//! `GET /api/v1/info`

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use evsedash_app::ports::DeviceApi;
use evsedash_domain::info::DeviceInfo;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the info endpoint.
pub enum GetResponse {
    Ok(Json<DeviceInfo>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/v1/info`
pub async fn get<D: DeviceApi + 'static>(
    State(state): State<AppState<D>>,
) -> Result<GetResponse, ApiError> {
    let info = state.charger.fetch_info().await?;
    Ok(GetResponse::Ok(Json(info)))
}
