//! JSON REST API handler modules, one per charger resource.

#[allow(clippy::missing_errors_doc)]
pub mod info;
#[allow(clippy::missing_errors_doc)]
pub mod restart;
#[allow(clippy::missing_errors_doc)]
pub mod settings;
#[allow(clippy::missing_errors_doc)]
pub mod state;

use axum::Router;
use axum::routing::{get, post};

use evsedash_app::ports::DeviceApi;

use crate::state::AppState;

/// Build the `/api/v1` sub-router.
pub fn routes<D>() -> Router<AppState<D>>
where
    D: DeviceApi + 'static,
{
    Router::new()
        .route("/state", get(state::get::<D>))
        .route(
            "/settings",
            get(settings::get::<D>).post(settings::update::<D>),
        )
        .route("/info", get(info::get::<D>))
        .route("/restart", post(restart::request::<D>))
}
