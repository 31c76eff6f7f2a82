//! # evsedash — charger dashboard on the command line
//!
//! Composition root that wires the sync client to a real charger, or serves a
//! virtual one.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Initialize `tracing` with the configured filter
//! - Build the reqwest transport and the sync client for client subcommands
//! - Build the virtual charger and the axum router for `simulate`
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod commands;
mod config;
mod error;
mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use evsedash_domain::settings::CableLockMode;

use crate::commands::SettingsEdit;
use crate::config::Config;

/// Monitor and configure an EV charger over its REST API.
#[derive(Parser, Debug)]
#[command(name = "evsedash", version, about)]
struct Cli {
    /// Configuration file.
    #[arg(long, global = true, default_value = "evsedash.toml")]
    config: PathBuf,

    /// Charger base URL, overriding the configuration.
    #[arg(long, global = true)]
    device_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the charger and print every state update until interrupted.
    Watch {
        /// Polling interval in milliseconds, overriding the configuration.
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Change settings and print what the charger stored.
    Set(SetArgs),
    /// Print the charger's stored settings.
    Reset,
    /// Restart the charger and wait for it to come back.
    Restart {
        /// Delay before the charger reboots, in milliseconds.
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Serve a virtual charger on the charger API routes.
    Simulate {
        /// `host:port` to listen on, overriding the configuration.
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SetArgs {
    /// Maximum charging current in amperes (6 to 63).
    #[arg(long)]
    max_current: Option<f64>,
    /// Charging current in amperes (6 to the maximum).
    #[arg(long)]
    current: Option<f64>,
    #[arg(long, value_enum)]
    cable_lock: Option<CableLockArg>,
    #[arg(long)]
    wifi_enabled: Option<bool>,
    #[arg(long)]
    wifi_ssid: Option<String>,
    #[arg(long)]
    wifi_password: Option<String>,
    /// Restart right away when wifi changes need it.
    #[arg(long)]
    restart: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CableLockArg {
    None,
    Motor,
    Solenoid,
}

impl From<CableLockArg> for CableLockMode {
    fn from(arg: CableLockArg) -> Self {
        match arg {
            CableLockArg::None => Self::None,
            CableLockArg::Motor => Self::Motor,
            CableLockArg::Solenoid => Self::Solenoid,
        }
    }
}

impl SetArgs {
    fn into_edit(self) -> (SettingsEdit, bool) {
        let edit = SettingsEdit {
            max_charging_current: self.max_current,
            charging_current: self.current,
            cable_lock: self.cable_lock.map(CableLockMode::from),
            wifi_enabled: self.wifi_enabled,
            wifi_ssid: self.wifi_ssid,
            wifi_password: self.wifi_password,
        };
        (edit, self.restart)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(url) = cli.device_url {
        config.device.base_url = url;
        config.validate()?;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Command::Watch { interval_ms } => {
            if let Some(ms) = interval_ms {
                config.polling.interval_ms = ms;
                config.validate()?;
            }
            commands::watch(&config, config.poll_interval()).await?;
        }
        Command::Set(args) => {
            let (edit, restart) = args.into_edit();
            commands::set(&config, edit, restart).await?;
        }
        Command::Reset => commands::reset(&config).await?,
        Command::Restart { delay_ms } => {
            if let Some(ms) = delay_ms {
                config.restart.delay_ms = ms;
            }
            commands::restart(&config).await?;
        }
        Command::Simulate { bind } => {
            if let Some(bind) = bind {
                config.set_bind(&bind)?;
            }
            commands::simulate(&config).await?;
        }
    }

    Ok(())
}
