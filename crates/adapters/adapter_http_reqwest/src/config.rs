//! Charger connection configuration.

use std::time::Duration;

use serde::Deserialize;

/// Address the charger serves its API on while in access-point mode.
pub const DEFAULT_BASE_URL: &str = "http://192.168.4.1";

/// How to reach the charger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Scheme, host and optional port of the charger (e.g. `http://192.168.4.1`).
    ///
    /// `/api/v1/...` is appended to it.
    pub base_url: String,
    /// Per-request timeout, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 5000,
        }
    }
}

impl HttpConfig {
    /// Config pointing at `base_url` with the default timeout.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_access_point_address() {
        let config = HttpConfig::default();
        assert_eq!(config.base_url, "http://192.168.4.1");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn should_fill_missing_fields_with_defaults() {
        let config: HttpConfig = toml::from_str("base_url = 'http://evse.local'").unwrap();
        assert_eq!(config.base_url, "http://evse.local");
        assert_eq!(config.timeout_ms, 5000);
    }
}
