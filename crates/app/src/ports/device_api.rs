//! Charger API port — the five REST calls the sync client relies on.
//!
//! Implementations live in adapter crates: `adapter_http_reqwest` talks to a
//! real charger over HTTP, `adapter_virtual` simulates one in memory.

use std::future::Future;
use std::sync::Arc;

use evsedash_domain::error::DeviceError;
use evsedash_domain::info::DeviceInfo;
use evsedash_domain::restart::RestartRequest;
use evsedash_domain::settings::DeviceSettings;
use evsedash_domain::state::DeviceState;

/// Access to a charger exposing `/api/v1/{state,settings,info,restart}`.
pub trait DeviceApi: Send + Sync {
    /// `GET /api/v1/state`
    fn fetch_state(&self) -> impl Future<Output = Result<DeviceState, DeviceError>> + Send;

    /// `GET /api/v1/settings`
    fn fetch_settings(&self) -> impl Future<Output = Result<DeviceSettings, DeviceError>> + Send;

    /// `POST /api/v1/settings`: full document replace. Any response body is
    /// ignored; callers re-read settings to learn what the charger stored.
    fn write_settings(
        &self,
        settings: &DeviceSettings,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    /// `GET /api/v1/info`
    fn fetch_info(&self) -> impl Future<Output = Result<DeviceInfo, DeviceError>> + Send;

    /// `POST /api/v1/restart`
    fn request_restart(
        &self,
        request: RestartRequest,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;
}

impl<T: DeviceApi> DeviceApi for Arc<T> {
    fn fetch_state(&self) -> impl Future<Output = Result<DeviceState, DeviceError>> + Send {
        (**self).fetch_state()
    }

    fn fetch_settings(&self) -> impl Future<Output = Result<DeviceSettings, DeviceError>> + Send {
        (**self).fetch_settings()
    }

    fn write_settings(
        &self,
        settings: &DeviceSettings,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send {
        (**self).write_settings(settings)
    }

    fn fetch_info(&self) -> impl Future<Output = Result<DeviceInfo, DeviceError>> + Send {
        (**self).fetch_info()
    }

    fn request_restart(
        &self,
        request: RestartRequest,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send {
        (**self).request_restart(request)
    }
}
