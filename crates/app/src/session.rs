//! Busy/error envelope wrapped around every user-triggered client operation.
//!
//! Each operation moves `Idle → Busy → Idle`, leaving an error marker behind
//! when it fails. Operations are independent: two may be busy at once, and
//! the session reports loading while at least one is in flight.

use tokio::sync::watch;

/// A user-triggered client operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Initialize,
    SubmitSettings,
    ResetSettings,
    Restart,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialize => f.write_str("initialize"),
            Self::SubmitSettings => f.write_str("submit settings"),
            Self::ResetSettings => f.write_str("reset settings"),
            Self::Restart => f.write_str("restart"),
        }
    }
}

/// Error marker left by a failed operation.
///
/// Carries no transport detail: network failures, bad statuses and malformed
/// bodies all collapse into this one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{operation} request failed")]
pub struct SyncFailure {
    /// Operation that failed.
    pub operation: Operation,
}

/// Snapshot of the envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStatus {
    in_flight: usize,
    error: Option<SyncFailure>,
}

impl SyncStatus {
    /// Whether at least one operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Error left by the most recent failed operation, if it has not been
    /// cleared by a later call.
    #[must_use]
    pub fn error(&self) -> Option<SyncFailure> {
        self.error
    }
}

/// Shared, observable busy/error envelope.
pub struct SyncSession {
    status: watch::Sender<SyncStatus>,
}

impl Default for SyncSession {
    fn default() -> Self {
        Self {
            status: watch::Sender::new(SyncStatus::default()),
        }
    }
}

impl SyncSession {
    /// Current envelope snapshot.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    /// Observe envelope changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Enter `Busy` for `operation`, clearing any previous error marker.
    ///
    /// The returned guard must be resolved with [`BusyGuard::succeed`] or
    /// [`BusyGuard::fail`]. Dropping it unresolved (e.g. the operation's
    /// future was cancelled) leaves busy without setting an error.
    #[must_use]
    pub fn begin(&self, operation: Operation) -> BusyGuard<'_> {
        self.status.send_modify(|status| {
            status.in_flight += 1;
            status.error = None;
        });
        BusyGuard {
            session: self,
            operation,
            resolved: false,
        }
    }

    fn leave(&self, error: Option<SyncFailure>) {
        self.status.send_modify(|status| {
            status.in_flight = status.in_flight.saturating_sub(1);
            if error.is_some() {
                status.error = error;
            }
        });
    }
}

/// One in-flight operation inside a [`SyncSession`].
pub struct BusyGuard<'a> {
    session: &'a SyncSession,
    operation: Operation,
    resolved: bool,
}

impl BusyGuard<'_> {
    /// Leave busy after a successful operation.
    pub fn succeed(mut self) {
        self.resolved = true;
        self.session.leave(None);
    }

    /// Leave busy and record the error marker.
    pub fn fail(mut self) {
        self.resolved = true;
        self.session.leave(Some(SyncFailure {
            operation: self.operation,
        }));
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            self.session.leave(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_idle_without_error() {
        let session = SyncSession::default();
        assert!(!session.status().is_loading());
        assert_eq!(session.status().error(), None);
    }

    #[test]
    fn should_be_loading_while_guard_is_held() {
        let session = SyncSession::default();
        let guard = session.begin(Operation::Initialize);
        assert!(session.status().is_loading());

        guard.succeed();
        assert!(!session.status().is_loading());
        assert_eq!(session.status().error(), None);
    }

    #[test]
    fn should_record_failure_when_operation_fails() {
        let session = SyncSession::default();
        session.begin(Operation::ResetSettings).fail();

        let status = session.status();
        assert!(!status.is_loading());
        assert_eq!(
            status.error(),
            Some(SyncFailure {
                operation: Operation::ResetSettings
            })
        );
    }

    #[test]
    fn should_clear_error_when_next_operation_begins() {
        let session = SyncSession::default();
        session.begin(Operation::Restart).fail();

        let guard = session.begin(Operation::Initialize);
        assert_eq!(session.status().error(), None);
        guard.succeed();
        assert_eq!(session.status().error(), None);
    }

    #[test]
    fn should_stay_loading_until_every_operation_finishes() {
        let session = SyncSession::default();
        let submit = session.begin(Operation::SubmitSettings);
        let reset = session.begin(Operation::ResetSettings);

        submit.succeed();
        assert!(session.status().is_loading());

        reset.fail();
        assert!(!session.status().is_loading());
    }

    #[test]
    fn should_leave_busy_without_error_when_guard_is_dropped() {
        let session = SyncSession::default();
        drop(session.begin(Operation::Initialize));

        assert!(!session.status().is_loading());
        assert_eq!(session.status().error(), None);
    }

    #[test]
    fn should_notify_subscribers_on_change() {
        let session = SyncSession::default();
        let mut rx = session.subscribe();
        assert!(!rx.has_changed().unwrap());

        session.begin(Operation::Initialize).succeed();
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn should_describe_failure_with_operation_name() {
        let failure = SyncFailure {
            operation: Operation::SubmitSettings,
        };
        assert_eq!(failure.to_string(), "submit settings request failed");
    }
}
