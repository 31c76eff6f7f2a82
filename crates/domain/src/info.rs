//! Body of `GET /api/v1/info`. Static for the lifetime of a boot.

use serde::{Deserialize, Serialize};

/// Firmware and hardware description. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Seconds since boot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Version of the SDK the firmware was built with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idf_version: Option<String>,
    /// Chip model, e.g. `esp32`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chip_cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chip_revision: Option<u32>,
    /// Application version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_time: Option<String>,
    /// Station interface MAC address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    /// Access-point interface MAC address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_ap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_ap: Option<String>,
}
