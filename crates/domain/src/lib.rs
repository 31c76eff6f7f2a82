//! # evsedash-domain
//!
//! Pure domain model for the evsedash charger client.
//!
//! ## Responsibilities
//! - Define the three resources the charger exposes:
//!   - **State** (operating mode, error code, per-phase currents and voltages)
//!   - **Settings** (charging currents, cable lock, wifi credentials)
//!   - **Info** (uptime, firmware and chip description)
//! - Define the **restart request** sent to the charger
//! - Define **sync events** emitted by the client towards a presentation layer
//! - Define the error raised when talking to a charger fails
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod event;
pub mod info;
pub mod restart;
pub mod settings;
pub mod state;
