//! Charger state — body of `GET /api/v1/state`.
//!
//! The charger owns this document; the client only ever replaces its copy
//! wholesale with the latest response.

use serde::{Deserialize, Serialize};

/// Operating mode reported in the `state` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ChargerMode {
    /// No vehicle plugged in.
    NotConnected,
    /// Vehicle connected and ready to charge.
    Ready,
    /// Vehicle charging.
    Charging,
    /// Vehicle charging, ventilation required.
    ChargingVentilated,
    /// Charger reports an error (see the error code).
    Error,
    /// Error the charger could not classify.
    UnknownError,
}

impl ChargerMode {
    /// All modes, ordered by wire code.
    pub const ALL: [Self; 6] = [
        Self::NotConnected,
        Self::Ready,
        Self::Charging,
        Self::ChargingVentilated,
        Self::Error,
        Self::UnknownError,
    ];

    /// Human-readable description shown to the user.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NotConnected => "Not connected",
            Self::Ready => "EV connected, ready to charge",
            Self::Charging => "EV charging",
            Self::ChargingVentilated => "EV charging, ventilation required",
            Self::Error => "Error",
            Self::UnknownError => "Unknown error",
        }
    }

    /// Whether current flows to the vehicle in this mode.
    #[must_use]
    pub fn is_charging(self) -> bool {
        matches!(self, Self::Charging | Self::ChargingVentilated)
    }

    /// Whether this mode is one of the error modes.
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::UnknownError)
    }
}

/// Raised when the `state` field carries a code outside `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown charger mode code {0}")]
pub struct UnknownModeError(pub u8);

impl TryFrom<u8> for ChargerMode {
    type Error = UnknownModeError;

    fn try_from(code: u8) -> Result<Self, UnknownModeError> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(UnknownModeError(code))
    }
}

impl From<ChargerMode> for u8 {
    fn from(mode: ChargerMode) -> Self {
        match mode {
            ChargerMode::NotConnected => 0,
            ChargerMode::Ready => 1,
            ChargerMode::Charging => 2,
            ChargerMode::ChargingVentilated => 3,
            ChargerMode::Error => 4,
            ChargerMode::UnknownError => 5,
        }
    }
}

impl std::fmt::Display for ChargerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Live charger readings. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    /// Operating mode.
    #[serde(rename = "state", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ChargerMode>,
    /// Error code, meaningful when the mode is an error mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l1_current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l2_current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l3_current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l1_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l2_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l3_voltage: Option<f64>,
}

impl DeviceState {
    /// Per-phase currents in amperes, L1 to L3.
    #[must_use]
    pub fn currents(&self) -> [Option<f64>; 3] {
        [self.l1_current, self.l2_current, self.l3_current]
    }

    /// Per-phase voltages in volts, L1 to L3.
    #[must_use]
    pub fn voltages(&self) -> [Option<f64>; 3] {
        [self.l1_voltage, self.l2_voltage, self.l3_voltage]
    }

    /// Whether nothing has been received yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
