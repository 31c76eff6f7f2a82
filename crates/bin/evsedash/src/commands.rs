//! Subcommand implementations.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use evsedash_adapter_http_axum::router;
use evsedash_adapter_http_axum::state::AppState;
use evsedash_adapter_http_reqwest::HttpDeviceApi;
use evsedash_adapter_virtual::VirtualCharger;
use evsedash_app::event_bus::InProcessEventBus;
use evsedash_app::session::{Operation, SyncFailure};
use evsedash_app::sync_client::{DeviceSyncClient, SubmitOutcome};
use evsedash_domain::event::SyncEvent;
use evsedash_domain::settings::{CableLockMode, DeviceSettings};

use crate::config::Config;
use crate::error::CliError;
use crate::render;

type Client = DeviceSyncClient<HttpDeviceApi, Arc<InProcessEventBus>>;

/// Settings edits requested on the command line.
#[derive(Debug, Default)]
pub struct SettingsEdit {
    pub max_charging_current: Option<f64>,
    pub charging_current: Option<f64>,
    pub cable_lock: Option<CableLockMode>,
    pub wifi_enabled: Option<bool>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
}

impl SettingsEdit {
    fn apply(self, settings: &mut DeviceSettings) {
        if self.max_charging_current.is_some() {
            settings.max_charging_current = self.max_charging_current;
        }
        if self.charging_current.is_some() {
            settings.charging_current = self.charging_current;
        }
        if self.cable_lock.is_some() {
            settings.cable_lock = self.cable_lock;
        }
        if self.wifi_enabled.is_some() {
            settings.wifi_enabled = self.wifi_enabled;
        }
        if self.wifi_ssid.is_some() {
            settings.wifi_ssid = self.wifi_ssid;
        }
        if self.wifi_password.is_some() {
            settings.wifi_password = self.wifi_password;
        }
    }
}

fn connect(config: &Config) -> Result<(Client, broadcast::Receiver<SyncEvent>), CliError> {
    let api = HttpDeviceApi::new(&config.device)?;
    let bus = Arc::new(InProcessEventBus::new(64));
    let events = bus.subscribe();
    let client = DeviceSyncClient::with_options(api, bus, config.sync_options());
    tracing::debug!(base_url = %config.device.base_url, "charger client ready");
    Ok((client, events))
}

fn failed(operation: Operation) -> CliError {
    CliError::Sync(SyncFailure { operation })
}

/// Load the charger, then print every state update until interrupted.
pub async fn watch(config: &Config, interval: Duration) -> Result<(), CliError> {
    let (client, _events) = connect(config)?;

    if client.initialize().await {
        println!("{}\n", render::info(&client.info()));
        println!("{}\n", render::settings(&client.settings()));
        println!("{}", render::state(&client.state()));
    } else {
        tracing::warn!("initial load failed, polling anyway");
    }

    let mut states = client.subscribe_state();
    client.start_state_polling(interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                return Ok(());
            }
            changed = states.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let state = states.borrow_and_update().clone();
                println!("{}", render::state(&state));
            }
        }
    }
}

/// Apply `edit` on top of the charger's settings and submit them.
///
/// Wifi edits require a restart; with `restart` set it happens right away.
pub async fn set(config: &Config, edit: SettingsEdit, restart: bool) -> Result<(), CliError> {
    let (client, events) = connect(config)?;
    if !client.initialize().await {
        return Err(failed(Operation::Initialize));
    }

    let before = client.settings();
    client.edit_settings(|settings| edit.apply(settings));
    client.set_wifi_dirty(before.wifi_differs(&client.settings()));

    let outcome = client.submit_settings(&client.settings()).await;
    let SubmitOutcome::Saved { restart_required } = outcome else {
        return Err(failed(Operation::SubmitSettings));
    };
    println!("{}", render::settings(&client.settings()));

    if restart_required {
        if restart {
            restart_and_wait(config, &client, events).await?;
        } else {
            println!("\nwifi changes apply after a restart: run `evsedash restart`");
        }
    }
    Ok(())
}

/// Discard any local state and print the charger's stored settings.
pub async fn reset(config: &Config) -> Result<(), CliError> {
    let (client, _events) = connect(config)?;
    if !client.reset_settings().await {
        return Err(failed(Operation::ResetSettings));
    }
    println!("{}", render::settings(&client.settings()));
    Ok(())
}

/// Restart the charger and wait for the session to reload.
pub async fn restart(config: &Config) -> Result<(), CliError> {
    let (client, events) = connect(config)?;
    restart_and_wait(config, &client, events).await
}

async fn restart_and_wait(
    config: &Config,
    client: &Client,
    mut events: broadcast::Receiver<SyncEvent>,
) -> Result<(), CliError> {
    if !client.restart(config.restart_delay()).await {
        return Err(failed(Operation::Restart));
    }

    loop {
        match events.recv().await {
            Ok(SyncEvent::CountdownTick { remaining }) => println!("reloading in {remaining} s"),
            Ok(SyncEvent::Reloading) => break,
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => return Ok(()),
        }
    }

    // The reload's initialize either publishes `Initialized` or gives up
    // after the transport timeout.
    let grace = config.device.timeout() + Duration::from_secs(1);
    let back = tokio::time::timeout(grace, async {
        loop {
            match events.recv().await {
                Ok(SyncEvent::Initialized) => return true,
                Err(RecvError::Closed) => return false,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
            }
        }
    })
    .await;

    if matches!(back, Ok(true)) {
        println!("{}", render::info(&client.info()));
        Ok(())
    } else {
        Err(CliError::NotBack(grace.as_secs()))
    }
}

/// Serve a virtual charger on the API routes until interrupted.
pub async fn simulate(config: &Config) -> Result<(), CliError> {
    let charger = Arc::new(VirtualCharger::default());
    let ticker = charger.spawn_ticker(config.tick_period());
    let app = router::build(AppState::from_arc(charger));

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "virtual charger listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("received SIGINT, shutting down");
            }
        })
        .await?;

    ticker.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_apply_only_requested_edits() {
        let mut settings = DeviceSettings {
            max_charging_current: Some(32.0),
            charging_current: Some(16.0),
            wifi_ssid: Some("garage".to_string()),
            ..DeviceSettings::default()
        };

        SettingsEdit {
            charging_current: Some(10.0),
            cable_lock: Some(CableLockMode::Motor),
            ..SettingsEdit::default()
        }
        .apply(&mut settings);

        assert_eq!(settings.max_charging_current, Some(32.0));
        assert_eq!(settings.charging_current, Some(10.0));
        assert_eq!(settings.cable_lock, Some(CableLockMode::Motor));
        assert_eq!(settings.wifi_ssid.as_deref(), Some("garage"));
    }

    #[test]
    fn should_mark_wifi_dirty_only_for_wifi_edits() {
        let before = DeviceSettings::default();

        let mut current_only = before.clone();
        SettingsEdit {
            charging_current: Some(10.0),
            ..SettingsEdit::default()
        }
        .apply(&mut current_only);

        let mut password = before.clone();
        SettingsEdit {
            wifi_password: Some("hunter2".to_string()),
            ..SettingsEdit::default()
        }
        .apply(&mut password);

        assert!(!before.wifi_differs(&current_only));
        assert!(before.wifi_differs(&password));
    }

    #[test]
    fn should_reject_invalid_device_url() {
        let mut config = Config::default();
        config.device.base_url = "ftp://evse".to_string();
        assert!(matches!(connect(&config), Err(CliError::Http(_))));
    }
}
