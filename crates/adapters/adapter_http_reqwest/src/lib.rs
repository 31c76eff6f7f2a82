//! # evsedash-adapter-http-reqwest
//!
//! HTTP adapter — implements the `DeviceApi` port against a charger's REST API.
//!
//! ## Endpoints
//!
//! | Call | Request | Success |
//! |------|---------|---------|
//! | `fetch_state` | `GET /api/v1/state` | 2xx + JSON [`DeviceState`] |
//! | `fetch_settings` | `GET /api/v1/settings` | 2xx + JSON [`DeviceSettings`] |
//! | `write_settings` | `POST /api/v1/settings` | 2xx, body ignored |
//! | `fetch_info` | `GET /api/v1/info` | 2xx + JSON [`DeviceInfo`] |
//! | `request_restart` | `POST /api/v1/restart` | 2xx, body ignored |
//!
//! Every request carries the configured timeout. Failures are reported as
//! [`HttpApiError`] internally and converted into `DeviceError` at the port.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `evsedash-app` and `evsedash-domain`.

mod config;
mod error;

pub use config::{DEFAULT_BASE_URL, HttpConfig};
pub use error::HttpApiError;

use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use evsedash_app::ports::DeviceApi;
use evsedash_domain::error::DeviceError;
use evsedash_domain::info::DeviceInfo;
use evsedash_domain::restart::RestartRequest;
use evsedash_domain::settings::DeviceSettings;
use evsedash_domain::state::DeviceState;

/// Charger reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDeviceApi {
    base_url: String,
    client: Client,
}

impl HttpDeviceApi {
    /// Build a client for the charger described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpApiError::InvalidBaseUrl`] if the base URL is not an
    /// absolute `http`/`https` URL, or [`HttpApiError::Client`] if the HTTP
    /// client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self, HttpApiError> {
        let invalid = || HttpApiError::InvalidBaseUrl(config.base_url.clone());
        let parsed = Url::parse(&config.base_url).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
            return Err(invalid());
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(HttpApiError::Client)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/api/v1/{resource}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, resource: &str) -> Result<T, HttpApiError> {
        let url = self.endpoint(resource);
        tracing::debug!(%url, "GET");
        let response = ensure_success(self.client.get(&url).send().await?)?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<(), HttpApiError> {
        let url = self.endpoint(resource);
        tracing::debug!(%url, "POST");
        ensure_success(self.client.post(&url).json(body).send().await?)?;
        Ok(())
    }
}

fn ensure_success(response: Response) -> Result<Response, HttpApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(HttpApiError::Status(status.as_u16()))
    }
}

impl DeviceApi for HttpDeviceApi {
    async fn fetch_state(&self) -> Result<DeviceState, DeviceError> {
        Ok(self.get("state").await?)
    }

    async fn fetch_settings(&self) -> Result<DeviceSettings, DeviceError> {
        Ok(self.get("settings").await?)
    }

    async fn write_settings(&self, settings: &DeviceSettings) -> Result<(), DeviceError> {
        Ok(self.post("settings", settings).await?)
    }

    async fn fetch_info(&self) -> Result<DeviceInfo, DeviceError> {
        Ok(self.get("info").await?)
    }

    async fn request_restart(&self, request: RestartRequest) -> Result<(), DeviceError> {
        Ok(self.post("restart", &request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{Method, StatusCode, Uri, header};
    use axum::response::IntoResponse;
    use evsedash_domain::state::ChargerMode;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    /// Request as seen by the canned charger.
    #[derive(Debug, Clone)]
    struct Seen {
        method: Method,
        path: String,
        body: Option<serde_json::Value>,
    }

    #[derive(Clone)]
    struct Canned {
        status: StatusCode,
        body: &'static str,
        seen: Arc<Mutex<Vec<Seen>>>,
    }

    async fn answer(
        State(canned): State<Canned>,
        method: Method,
        uri: Uri,
        body: Bytes,
    ) -> impl IntoResponse {
        canned.seen.lock().unwrap().push(Seen {
            method,
            path: uri.path().to_string(),
            body: serde_json::from_slice(&body).ok(),
        });
        (
            canned.status,
            [(header::CONTENT_TYPE, "application/json")],
            canned.body,
        )
    }

    /// Serve `body` with `status` on every route; returns the base URL and
    /// the requests received so far.
    async fn canned_charger(
        status: StatusCode,
        body: &'static str,
    ) -> (String, Arc<Mutex<Vec<Seen>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(answer).with_state(Canned {
            status,
            body,
            seen: Arc::clone(&seen),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), seen)
    }

    fn single(seen: &Mutex<Vec<Seen>>) -> Seen {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        seen[0].clone()
    }

    fn api(base_url: &str) -> HttpDeviceApi {
        HttpDeviceApi::new(&HttpConfig::with_base_url(base_url)).unwrap()
    }

    #[test]
    fn should_join_endpoint_without_double_slash() {
        let api = api("http://192.168.4.1/");
        assert_eq!(api.base_url(), "http://192.168.4.1");
        assert_eq!(api.endpoint("state"), "http://192.168.4.1/api/v1/state");
    }

    #[test]
    fn should_reject_non_http_base_url() {
        let err = HttpDeviceApi::new(&HttpConfig::with_base_url("ftp://evse.local")).unwrap_err();
        assert!(matches!(err, HttpApiError::InvalidBaseUrl(_)));
    }

    #[test]
    fn should_reject_relative_base_url() {
        let err = HttpDeviceApi::new(&HttpConfig::with_base_url("evse.local")).unwrap_err();
        assert!(matches!(err, HttpApiError::InvalidBaseUrl(_)));
    }

    #[tokio::test]
    async fn should_decode_state_document() {
        let (base, seen) = canned_charger(
            StatusCode::OK,
            r#"{"state":2,"error":0,"l1Current":15.5,"l1Voltage":231.0}"#,
        )
        .await;

        let state = api(&base).fetch_state().await.unwrap();

        assert_eq!(state.mode, Some(ChargerMode::Charging));
        assert_eq!(state.l1_current, Some(15.5));
        assert_eq!(state.l2_current, None);
        let request = single(&seen);
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/api/v1/state");
    }

    #[tokio::test]
    async fn should_post_settings_as_json() {
        let (base, seen) = canned_charger(StatusCode::CREATED, "").await;
        let settings = DeviceSettings {
            charging_current: Some(10.0),
            wifi_ssid: Some("garage".to_string()),
            ..DeviceSettings::default()
        };

        api(&base).write_settings(&settings).await.unwrap();

        let request = single(&seen);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/api/v1/settings");
        assert_eq!(
            request.body,
            Some(serde_json::json!({ "chargingCurrent": 10.0, "wifiSSID": "garage" }))
        );
    }

    #[tokio::test]
    async fn should_post_restart_delay() {
        let (base, seen) = canned_charger(StatusCode::CREATED, "{}").await;

        api(&base)
            .request_restart(RestartRequest { time: 500 })
            .await
            .unwrap();

        let request = single(&seen);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/api/v1/restart");
        assert_eq!(request.body, Some(serde_json::json!({ "time": 500 })));
    }

    #[tokio::test]
    async fn should_report_status_when_charger_rejects_request() {
        let (base, _seen) =
            canned_charger(StatusCode::BAD_REQUEST, r#"{"error":"no time"}"#).await;

        let err = api(&base)
            .request_restart(RestartRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DeviceError::Status(400)));
    }

    #[tokio::test]
    async fn should_report_decode_error_for_malformed_body() {
        let (base, _seen) = canned_charger(StatusCode::OK, "<html>").await;

        let err = api(&base).fetch_info().await.unwrap_err();

        assert!(matches!(err, DeviceError::Decode(_)));
    }

    #[tokio::test]
    async fn should_report_transport_error_when_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = api(&format!("http://{addr}"))
            .fetch_settings()
            .await
            .unwrap_err();

        assert!(matches!(err, DeviceError::Transport(_)));
    }
}
