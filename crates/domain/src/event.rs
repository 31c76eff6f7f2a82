//! Sync events — notifications the sync client emits for a presentation layer.

/// Something the presentation layer may want to react to.
///
/// Cache updates are observed through watch channels; these events cover the
/// one-shot signals the original UI showed as dialogs and snackbars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The combined initial fetch completed and all caches are populated.
    Initialized,
    /// Settings were written and re-read from the charger.
    SettingsSaved {
        /// Whether wifi fields were edited, so the charger must reboot.
        restart_required: bool,
    },
    /// The charger accepted a restart request.
    RestartScheduled {
        /// Delay the charger waits before rebooting, in milliseconds.
        delay_ms: u64,
    },
    /// One step of the post-restart countdown.
    CountdownTick {
        /// Seconds left before the session reloads.
        remaining: u32,
    },
    /// The countdown reached zero and the session is reloading.
    Reloading,
}
