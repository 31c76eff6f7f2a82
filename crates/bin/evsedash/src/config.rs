//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `evsedash.toml` in the working directory unless another path is
//! given. Every field has a sensible default so the file is optional.
//! Environment variables take precedence over file values.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use evsedash_adapter_http_reqwest::HttpConfig;
use evsedash_app::countdown::Countdown;
use evsedash_app::sync_client::SyncOptions;
use evsedash_domain::restart::DEFAULT_RESTART_DELAY_MS;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How to reach the charger.
    pub device: HttpConfig,
    /// State polling settings.
    pub polling: PollingConfig,
    /// Restart and countdown settings.
    pub restart: RestartConfig,
    /// Virtual charger server settings.
    pub simulator: SimulatorConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// State polling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Milliseconds between two state reads.
    pub interval_ms: u64,
}

/// Restart configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    /// Delay sent to the charger before it reboots, in milliseconds.
    pub delay_ms: u64,
    /// Seconds to wait before reloading once the restart was accepted.
    pub countdown_secs: u32,
}

/// Simulator listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Milliseconds between two steps of the simulated charging session.
    pub tick_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("EVSEDASH_DEVICE_URL") {
            self.device.base_url = val;
        }
        if let Some(val) = var("EVSEDASH_POLL_INTERVAL_MS") {
            if let Ok(interval) = val.parse() {
                self.polling.interval_ms = interval;
            }
        }
        if let Some(val) = var("EVSEDASH_BIND") {
            if let Some((host, port)) = parse_bind(&val) {
                self.simulator.host = host;
                self.simulator.port = port;
            }
        }
        if let Some(val) = var("EVSEDASH_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    /// Check semantic constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.device.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "device base_url must start with http:// or https://, got {url:?}"
            )));
        }
        if self.polling.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "polling interval must be non-zero".to_string(),
            ));
        }
        if self.simulator.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.simulator.tick_ms == 0 {
            return Err(ConfigError::Validation(
                "simulator tick must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Override the simulator listener with a `host:port` string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `bind` is not `host:port`.
    pub fn set_bind(&mut self, bind: &str) -> Result<(), ConfigError> {
        let (host, port) = parse_bind(bind)
            .ok_or_else(|| ConfigError::Validation(format!("invalid bind address {bind:?}")))?;
        self.simulator.host = host;
        self.simulator.port = port;
        self.validate()
    }

    /// Return the simulator's `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.simulator.host, self.simulator.port)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling.interval_ms)
    }

    #[must_use]
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart.delay_ms)
    }

    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.simulator.tick_ms)
    }

    /// Options for the sync client built from this configuration.
    #[must_use]
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            poll_interval: self.poll_interval(),
            countdown: Countdown::new(self.restart.countdown_secs, Duration::from_secs(1)),
        }
    }
}

fn parse_bind(value: &str) -> Option<(String, u16)> {
    let (host, port) = value.rsplit_once(':')?;
    let port = port.parse().ok()?;
    Some((host.to_string(), port))
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_RESTART_DELAY_MS,
            countdown_secs: evsedash_app::countdown::RESTART_COUNTDOWN_SECS,
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            tick_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "evsedash=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
