//! # evsedash-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the charger's **REST API** (`/api/v1/state`, `/api/v1/settings`,
//!   `/api/v1/info`, `/api/v1/restart`) in front of any `DeviceApi`, so a
//!   virtual charger can stand in for hardware
//! - Reproduce the firmware's status codes: `200` for reads, `201` for
//!   writes, `400` for malformed bodies
//! - Map device failures to `502`/`503` with a JSON `{"error": …}` body
//!
//! ## Dependency rule
//! Depends on `evsedash-app` (for the `DeviceApi` port) and `evsedash-domain`
//! (for the documents it serializes). Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
