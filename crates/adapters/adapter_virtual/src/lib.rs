//! # evsedash-adapter-virtual
//!
//! Virtual charger that implements the `DeviceApi` port in memory.
//!
//! It follows the firmware's rules so the sync client and the simulator
//! server can be exercised without hardware:
//!
//! | Resource | Behaviour |
//! |----------|-----------|
//! | state | Cycles through a charging session, one step per [`VirtualCharger::tick`] |
//! | settings | Applies only the fields present; currents are clamped; the wifi password is never read back |
//! | info | Static chip description, uptime since the last boot |
//! | restart | Goes offline after the requested delay, back after [`BOOT_DURATION`] |
//!
//! ## Dependency rule
//!
//! Depends on `evsedash-app` (port traits) and `evsedash-domain` only.

mod cycle;

pub use cycle::ChargingCycle;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use evsedash_app::ports::DeviceApi;
use evsedash_domain::error::DeviceError;
use evsedash_domain::info::DeviceInfo;
use evsedash_domain::restart::RestartRequest;
use evsedash_domain::settings::{
    CableLockMode, DEFAULT_MAX_CHARGING_CURRENT, DeviceSettings, MAX_CHARGING_CURRENT,
    MIN_CHARGING_CURRENT,
};
use evsedash_domain::state::DeviceState;

/// How long the virtual charger stays offline once a reboot starts.
pub const BOOT_DURATION: Duration = Duration::from_secs(3);

/// In-memory charger.
pub struct VirtualCharger {
    inner: Mutex<Charger>,
}

struct Charger {
    settings: DeviceSettings,
    cycle: ChargingCycle,
    booted_at: Instant,
    reboot_at: Option<Instant>,
}

impl Default for VirtualCharger {
    fn default() -> Self {
        Self::with_settings(DeviceSettings {
            max_charging_current: Some(DEFAULT_MAX_CHARGING_CURRENT),
            charging_current: Some(DEFAULT_MAX_CHARGING_CURRENT),
            cable_lock: Some(CableLockMode::None),
            wifi_enabled: Some(false),
            wifi_ssid: None,
            wifi_password: None,
        })
    }
}

impl VirtualCharger {
    /// Charger booted now with `settings` stored as-is.
    #[must_use]
    pub fn with_settings(settings: DeviceSettings) -> Self {
        Self {
            inner: Mutex::new(Charger {
                settings,
                cycle: ChargingCycle::default(),
                booted_at: Instant::now(),
                reboot_at: None,
            }),
        }
    }

    /// Advance the simulated charging session by one step.
    ///
    /// Ignored while the charger is rebooting.
    pub fn tick(&self) {
        let mut charger = self.lock();
        if charger.settle(Instant::now()).is_ok() {
            charger.cycle.advance();
        }
    }

    /// Spawn a task calling [`tick`](Self::tick) every `period`.
    ///
    /// The task stops once the charger is dropped or the handle is aborted.
    #[must_use]
    pub fn spawn_ticker(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let charger = Arc::downgrade(self);
        let period = period.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let Some(charger) = charger.upgrade() else {
                    break;
                };
                charger.tick();
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, Charger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Charger {
    /// Bring the reboot bookkeeping up to `now`.
    fn settle(&mut self, now: Instant) -> Result<(), DeviceError> {
        let Some(reboot_at) = self.reboot_at else {
            return Ok(());
        };
        if now < reboot_at {
            return Ok(());
        }
        let back_at = reboot_at + BOOT_DURATION;
        if now < back_at {
            return Err(DeviceError::Unavailable);
        }

        self.reboot_at = None;
        self.booted_at = back_at;
        self.cycle = ChargingCycle::default();
        tracing::info!("virtual charger rebooted");
        Ok(())
    }

    fn apply(&mut self, update: &DeviceSettings) {
        let stored = &mut self.settings;

        if let Some(max) = update.max_charging_current {
            let max = max.clamp(MIN_CHARGING_CURRENT, MAX_CHARGING_CURRENT);
            stored.max_charging_current = Some(max);
            if stored.charging_current.is_some_and(|current| current > max) {
                stored.charging_current = Some(max);
            }
        }
        if let Some(current) = update.charging_current {
            let max = stored
                .max_charging_current
                .unwrap_or(DEFAULT_MAX_CHARGING_CURRENT);
            // the stored maximum may sit below the floor; it wins
            stored.charging_current = Some(current.max(MIN_CHARGING_CURRENT).min(max));
        }
        if let Some(cable_lock) = update.cable_lock {
            stored.cable_lock = Some(cable_lock);
        }
        if let Some(enabled) = update.wifi_enabled {
            stored.wifi_enabled = Some(enabled);
        }
        if let Some(ssid) = &update.wifi_ssid {
            stored.wifi_ssid = Some(ssid.clone());
        }
        if let Some(password) = &update.wifi_password {
            stored.wifi_password = Some(password.clone());
        }
    }

    fn info(&self, now: Instant) -> DeviceInfo {
        DeviceInfo {
            uptime: Some(now.duration_since(self.booted_at).as_secs()),
            idf_version: Some("v5.1-virtual".to_string()),
            chip: Some("esp32".to_string()),
            chip_cores: Some(2),
            chip_revision: Some(3),
            app_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            app_date: None,
            app_time: None,
            mac: Some("02:00:00:00:00:01".to_string()),
            mac_ap: Some("02:00:00:00:00:02".to_string()),
            ip: Some("127.0.0.1".to_string()),
            ip_ap: Some("192.168.4.1".to_string()),
        }
    }
}

impl DeviceApi for VirtualCharger {
    async fn fetch_state(&self) -> Result<DeviceState, DeviceError> {
        let mut charger = self.lock();
        charger.settle(Instant::now())?;
        let current = charger
            .settings
            .charging_current
            .unwrap_or(DEFAULT_MAX_CHARGING_CURRENT);
        Ok(charger.cycle.state(current))
    }

    async fn fetch_settings(&self) -> Result<DeviceSettings, DeviceError> {
        let mut charger = self.lock();
        charger.settle(Instant::now())?;
        Ok(DeviceSettings {
            wifi_password: None,
            ..charger.settings.clone()
        })
    }

    async fn write_settings(&self, settings: &DeviceSettings) -> Result<(), DeviceError> {
        let mut charger = self.lock();
        charger.settle(Instant::now())?;
        charger.apply(settings);
        tracing::debug!("virtual charger settings updated");
        Ok(())
    }

    async fn fetch_info(&self) -> Result<DeviceInfo, DeviceError> {
        let now = Instant::now();
        let mut charger = self.lock();
        charger.settle(now)?;
        Ok(charger.info(now))
    }

    async fn request_restart(&self, request: RestartRequest) -> Result<(), DeviceError> {
        let now = Instant::now();
        let mut charger = self.lock();
        charger.settle(now)?;
        charger.reboot_at = Some(now + request.delay());
        tracing::info!(delay_ms = request.time, "virtual charger restart scheduled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evsedash_domain::state::ChargerMode;

    fn update(edit: impl FnOnce(&mut DeviceSettings)) -> DeviceSettings {
        let mut settings = DeviceSettings::default();
        edit(&mut settings);
        settings
    }

    #[tokio::test]
    async fn should_start_with_firmware_defaults() {
        let charger = VirtualCharger::default();
        let settings = charger.fetch_settings().await.unwrap();

        assert_eq!(settings.max_charging_current, Some(16.0));
        assert_eq!(settings.charging_current, Some(16.0));
        assert_eq!(settings.cable_lock, Some(CableLockMode::None));
        assert_eq!(settings.wifi_enabled, Some(false));
    }

    #[tokio::test]
    async fn should_never_return_wifi_password() {
        let charger = VirtualCharger::default();
        charger
            .write_settings(&update(|s| s.wifi_password = Some("hunter2".to_string())))
            .await
            .unwrap();

        let settings = charger.fetch_settings().await.unwrap();
        assert_eq!(settings.wifi_password, None);
    }

    #[tokio::test]
    async fn should_apply_only_present_fields() {
        let charger = VirtualCharger::default();
        charger
            .write_settings(&update(|s| s.wifi_ssid = Some("garage".to_string())))
            .await
            .unwrap();

        let settings = charger.fetch_settings().await.unwrap();
        assert_eq!(settings.wifi_ssid.as_deref(), Some("garage"));
        assert_eq!(settings.max_charging_current, Some(16.0));
        assert_eq!(settings.cable_lock, Some(CableLockMode::None));
    }

    #[tokio::test]
    async fn should_clamp_max_charging_current() {
        let charger = VirtualCharger::default();

        charger
            .write_settings(&update(|s| s.max_charging_current = Some(100.0)))
            .await
            .unwrap();
        let high = charger.fetch_settings().await.unwrap();

        charger
            .write_settings(&update(|s| s.max_charging_current = Some(2.0)))
            .await
            .unwrap();
        let low = charger.fetch_settings().await.unwrap();

        assert_eq!(high.max_charging_current, Some(63.0));
        assert_eq!(low.max_charging_current, Some(6.0));
    }

    #[tokio::test]
    async fn should_clamp_charging_current_to_maximum() {
        let charger = VirtualCharger::default();
        charger
            .write_settings(&update(|s| {
                s.max_charging_current = Some(32.0);
                s.charging_current = Some(40.0);
            }))
            .await
            .unwrap();

        let settings = charger.fetch_settings().await.unwrap();
        assert_eq!(settings.charging_current, Some(32.0));
    }

    #[tokio::test]
    async fn should_cap_charging_current_when_stored_maximum_is_below_floor() {
        let charger = VirtualCharger::with_settings(DeviceSettings {
            max_charging_current: Some(4.0),
            charging_current: Some(4.0),
            ..DeviceSettings::default()
        });

        charger
            .write_settings(&update(|s| s.charging_current = Some(10.0)))
            .await
            .unwrap();

        let settings = charger.fetch_settings().await.unwrap();
        assert_eq!(settings.charging_current, Some(4.0));
    }

    #[tokio::test]
    async fn should_lower_charging_current_when_maximum_drops() {
        let charger = VirtualCharger::default();
        charger
            .write_settings(&update(|s| s.max_charging_current = Some(10.0)))
            .await
            .unwrap();

        let settings = charger.fetch_settings().await.unwrap();
        assert_eq!(settings.charging_current, Some(10.0));
    }

    #[tokio::test]
    async fn should_report_charging_current_while_charging() {
        let charger = VirtualCharger::default();
        charger
            .write_settings(&update(|s| s.charging_current = Some(12.0)))
            .await
            .unwrap();
        for _ in 0..8 {
            charger.tick();
        }

        let state = charger.fetch_state().await.unwrap();
        assert_eq!(state.mode, Some(ChargerMode::Charging));
        assert_eq!(state.l1_current, Some(12.0));
    }

    #[tokio::test(start_paused = true)]
    async fn should_count_uptime_since_boot() {
        let charger = VirtualCharger::default();
        tokio::time::sleep(Duration::from_secs(42)).await;

        let info = charger.fetch_info().await.unwrap();
        assert_eq!(info.uptime, Some(42));
        assert_eq!(info.chip.as_deref(), Some("esp32"));
    }

    #[tokio::test(start_paused = true)]
    async fn should_go_offline_after_restart_delay() {
        let charger = VirtualCharger::default();
        tokio::time::sleep(Duration::from_secs(60)).await;
        charger.request_restart(RestartRequest { time: 500 }).await.unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(charger.fetch_state().await.is_ok());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(matches!(
            charger.fetch_state().await,
            Err(DeviceError::Unavailable)
        ));

        tokio::time::sleep(BOOT_DURATION).await;
        let info = charger.fetch_info().await.unwrap();
        assert_eq!(info.uptime, Some(0));
        assert_eq!(
            charger.fetch_state().await.unwrap().mode,
            Some(ChargerMode::NotConnected)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_settings_across_reboot() {
        let charger = VirtualCharger::default();
        charger
            .write_settings(&update(|s| s.cable_lock = Some(CableLockMode::Motor)))
            .await
            .unwrap();
        charger.request_restart(RestartRequest { time: 0 }).await.unwrap();

        tokio::time::sleep(BOOT_DURATION + Duration::from_millis(1)).await;

        let settings = charger.fetch_settings().await.unwrap();
        assert_eq!(settings.cable_lock, Some(CableLockMode::Motor));
    }

    #[tokio::test(start_paused = true)]
    async fn should_tick_in_background() {
        let charger = Arc::new(VirtualCharger::default());
        let handle = charger.spawn_ticker(Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(8500)).await;
        handle.abort();

        let state = charger.fetch_state().await.unwrap();
        assert_eq!(state.mode, Some(ChargerMode::Charging));
    }
}
