//! Plain-text rendering of charger documents for the terminal.
//!
//! Absent fields print as `unknown`.

use std::fmt::Display;

use evsedash_domain::info::DeviceInfo;
use evsedash_domain::settings::DeviceSettings;
use evsedash_domain::state::DeviceState;

const UNKNOWN: &str = "unknown";

fn or_unknown<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| format!("{v:.1} {unit}"))
}

/// One line per state update.
#[must_use]
pub fn state(state: &DeviceState) -> String {
    let phases = state
        .currents()
        .into_iter()
        .zip(state.voltages())
        .enumerate()
        .map(|(i, (current, voltage))| {
            format!(
                "L{} {} @ {}",
                i + 1,
                with_unit(current, "A"),
                with_unit(voltage, "V")
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{} (error {}) | {phases}",
        or_unknown(state.mode),
        or_unknown(state.error)
    )
}

#[must_use]
pub fn settings(settings: &DeviceSettings) -> String {
    [
        format!(
            "max charging current: {}",
            with_unit(settings.max_charging_current, "A")
        ),
        format!(
            "charging current:     {}",
            with_unit(settings.charging_current, "A")
        ),
        format!("cable lock:           {}", or_unknown(settings.cable_lock)),
        format!("wifi enabled:         {}", or_unknown(settings.wifi_enabled)),
        format!(
            "wifi SSID:            {}",
            or_unknown(settings.wifi_ssid.as_deref())
        ),
    ]
    .join("\n")
}

#[must_use]
pub fn info(info: &DeviceInfo) -> String {
    [
        format!(
            "app version: {} ({} {})",
            or_unknown(info.app_version.as_deref()),
            or_unknown(info.app_date.as_deref()),
            or_unknown(info.app_time.as_deref())
        ),
        format!("IDF version: {}", or_unknown(info.idf_version.as_deref())),
        format!(
            "chip:        {} rev {}, {} cores",
            or_unknown(info.chip.as_deref()),
            or_unknown(info.chip_revision),
            or_unknown(info.chip_cores)
        ),
        format!("uptime:      {} s", or_unknown(info.uptime)),
        format!(
            "station:     {} / {}",
            or_unknown(info.ip.as_deref()),
            or_unknown(info.mac.as_deref())
        ),
        format!(
            "access point: {} / {}",
            or_unknown(info.ip_ap.as_deref()),
            or_unknown(info.mac_ap.as_deref())
        ),
    ]
    .join("\n")
}
