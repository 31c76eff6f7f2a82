//! # evsedash-app
//!
//! Application layer — the charger sync client and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceApi` — the five charger REST calls
//!   - `EventPublisher` — one-shot notifications for a presentation layer
//! - Provide the **driving/inbound** use-case object:
//!   - `DeviceSyncClient` — initial load, state polling, settings submit/reset,
//!     restart with countdown and reload
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (event bus, busy/error envelope, countdown timer)
//!
//! ## Dependency rule
//! Depends on `evsedash-domain` only (plus `tokio` for tasks, timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod countdown;
pub mod event_bus;
pub mod ports;
pub mod session;
pub mod sync_client;
