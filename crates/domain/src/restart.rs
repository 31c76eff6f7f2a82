//! Restart request — body of `POST /api/v1/restart`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay the original UI asks the charger to wait before rebooting.
pub const DEFAULT_RESTART_DELAY_MS: u64 = 500;

/// Ask the charger to reboot after `time` milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartRequest {
    /// Delay before the reboot, in milliseconds.
    pub time: u64,
}

impl RestartRequest {
    /// Build a request from a [`Duration`], truncated to whole milliseconds.
    #[must_use]
    pub fn after(delay: Duration) -> Self {
        Self {
            time: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// The requested delay.
    #[must_use]
    pub fn delay(self) -> Duration {
        Duration::from_millis(self.time)
    }
}

impl Default for RestartRequest {
    fn default() -> Self {
        Self {
            time: DEFAULT_RESTART_DELAY_MS,
        }
    }
}
