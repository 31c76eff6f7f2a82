//! HTTP adapter error types.

use evsedash_domain::error::DeviceError;

/// Errors raised while talking to a charger over HTTP.
#[derive(Debug, thiserror::Error)]
pub enum HttpApiError {
    /// The configured base URL is not an absolute `http`/`https` URL.
    #[error("invalid charger base URL {0:?}")]
    InvalidBaseUrl(String),

    /// The HTTP client could not be built (TLS backend, etc.).
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// Connection, timeout or body transfer failure.
    #[error("request to charger failed")]
    Request(#[from] reqwest::Error),

    /// The charger answered with a non-2xx status.
    #[error("charger answered with HTTP status {0}")]
    Status(u16),

    /// The response body is not the expected JSON document.
    #[error("malformed response body")]
    Decode(#[from] serde_json::Error),
}

impl From<HttpApiError> for DeviceError {
    fn from(err: HttpApiError) -> Self {
        match err {
            HttpApiError::Status(code) => Self::Status(code),
            HttpApiError::Decode(err) => Self::decode(err),
            other => Self::transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_invalid_base_url() {
        let err = HttpApiError::InvalidBaseUrl("ftp://evse".to_string());
        assert_eq!(err.to_string(), "invalid charger base URL \"ftp://evse\"");
    }

    #[test]
    fn should_keep_status_code_when_converting() {
        let err: DeviceError = HttpApiError::Status(404).into();
        assert!(matches!(err, DeviceError::Status(404)));
    }

    #[test]
    fn should_convert_json_error_to_decode() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DeviceError = HttpApiError::Decode(json_err).into();
        assert!(matches!(err, DeviceError::Decode(_)));
    }

    #[test]
    fn should_convert_other_errors_to_transport() {
        let err: DeviceError = HttpApiError::InvalidBaseUrl(String::new()).into();
        assert!(matches!(err, DeviceError::Transport(_)));
    }
}
