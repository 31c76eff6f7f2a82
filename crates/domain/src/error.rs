//! Errors raised while talking to a charger.
//!
//! Adapters keep their own typed errors and convert into [`DeviceError`] at
//! the port boundary. The sync client collapses every variant into a single
//! "request failed" marker; the variants only exist so the failure can be
//! logged with some detail.

use std::error::Error;

/// Boxed source error carried by [`DeviceError`] variants.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Failure of a single request against the charger API.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The request never produced a response (connection refused, timeout, …).
    #[error("charger unreachable")]
    Transport(#[source] BoxError),

    /// The charger answered with a non-success HTTP status.
    #[error("charger answered with HTTP status {0}")]
    Status(u16),

    /// The response body could not be decoded into the expected document.
    #[error("malformed response body")]
    Decode(#[source] BoxError),

    /// The charger is rebooting and does not serve requests.
    #[error("charger is restarting")]
    Unavailable,
}

impl DeviceError {
    /// Wrap any error as a transport failure.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Wrap any error as a decoding failure.
    pub fn decode(err: impl Into<BoxError>) -> Self {
        Self::Decode(err.into())
    }
}
