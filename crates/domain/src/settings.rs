//! Charger settings — body of `GET`/`POST /api/v1/settings`.
//!
//! The charger is the source of truth. Clients keep an editable working copy
//! and push it back as a full document on submit.

use serde::{Deserialize, Serialize};

/// Lowest charging current the charger accepts, in amperes.
pub const MIN_CHARGING_CURRENT: f64 = 6.0;
/// Highest configurable maximum charging current, in amperes.
pub const MAX_CHARGING_CURRENT: f64 = 63.0;
/// Maximum charging current of a freshly flashed charger, in amperes.
pub const DEFAULT_MAX_CHARGING_CURRENT: f64 = 16.0;

/// Cable lock actuator fitted to the socket (`cableLock` field).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CableLockMode {
    /// No lock; tethered cable or manual socket.
    #[default]
    None,
    /// Motor-driven lock.
    Motor,
    /// Solenoid lock.
    Solenoid,
}

/// Raised when the `cableLock` field carries a code outside `0..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown cable lock code {0}")]
pub struct UnknownCableLockError(pub u8);

impl TryFrom<u8> for CableLockMode {
    type Error = UnknownCableLockError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Motor),
            2 => Ok(Self::Solenoid),
            other => Err(UnknownCableLockError(other)),
        }
    }
}

impl From<CableLockMode> for u8 {
    fn from(mode: CableLockMode) -> Self {
        match mode {
            CableLockMode::None => 0,
            CableLockMode::Motor => 1,
            CableLockMode::Solenoid => 2,
        }
    }
}

impl std::fmt::Display for CableLockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Motor => f.write_str("motor"),
            Self::Solenoid => f.write_str("solenoid"),
        }
    }
}

/// User-editable charger configuration. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSettings {
    /// Upper bound for [`charging_current`](Self::charging_current), in amperes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_charging_current: Option<f64>,
    /// Current offered to the vehicle, in amperes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charging_current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cable_lock: Option<CableLockMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi_enabled: Option<bool>,
    #[serde(rename = "wifiSSID", default, skip_serializing_if = "Option::is_none")]
    pub wifi_ssid: Option<String>,
    /// Write-only on real chargers: reads never return it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi_password: Option<String>,
}

impl DeviceSettings {
    /// Whether any wifi-related field differs from `other`.
    ///
    /// The sync client does not call this itself; it is a helper for callers
    /// that want to derive the wifi-dirty flag from an actual diff.
    #[must_use]
    pub fn wifi_differs(&self, other: &Self) -> bool {
        self.wifi_enabled != other.wifi_enabled
            || self.wifi_ssid != other.wifi_ssid
            || self.wifi_password != other.wifi_password
    }
}
