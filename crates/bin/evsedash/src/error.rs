//! Command-line error types.

use evsedash_adapter_http_reqwest::HttpApiError;
use evsedash_app::session::SyncFailure;

use crate::config::ConfigError;

/// Errors that end a command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot reach charger")]
    Http(#[from] HttpApiError),

    /// A sync client operation reported failure; details were logged.
    #[error(transparent)]
    Sync(#[from] SyncFailure),

    /// The charger did not come back after a restart.
    #[error("charger did not answer within {0} s of reloading")]
    NotBack(u64),

    #[error("simulator server failed")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use evsedash_app::session::Operation;

    #[test]
    fn should_display_failed_operation() {
        let err = CliError::from(SyncFailure {
            operation: Operation::SubmitSettings,
        });
        assert_eq!(err.to_string(), "submit settings request failed");
    }

    #[test]
    fn should_display_validation_error() {
        let err = CliError::from(ConfigError::Validation("port must be non-zero".to_string()));
        assert_eq!(err.to_string(), "invalid configuration: port must be non-zero");
    }
}
