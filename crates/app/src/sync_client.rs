//! Device sync client — keeps a local copy of charger state, settings and
//! info in step with the charger.
//!
//! The client owns three cached documents, each in its own `watch` channel:
//!
//! | Document | Refreshed by |
//! |----------|--------------|
//! | [`DeviceState`] | [`initialize`](DeviceSyncClient::initialize), every polling tick |
//! | [`DeviceSettings`] | [`initialize`](DeviceSyncClient::initialize), [`submit_settings`](DeviceSyncClient::submit_settings), [`reset_settings`](DeviceSyncClient::reset_settings) |
//! | [`DeviceInfo`] | [`initialize`](DeviceSyncClient::initialize) |
//!
//! The cached settings double as the user's working copy: edits made through
//! [`edit_settings`](DeviceSyncClient::edit_settings) stay local until
//! submitted. Polling never touches settings.
//!
//! User-triggered operations run inside the [`SyncSession`] busy/error
//! envelope and never return errors: failures are logged, recorded as an
//! error marker and otherwise swallowed, leaving the caches untouched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use evsedash_domain::event::SyncEvent;
use evsedash_domain::info::DeviceInfo;
use evsedash_domain::restart::RestartRequest;
use evsedash_domain::settings::DeviceSettings;
use evsedash_domain::state::DeviceState;

use crate::countdown::Countdown;
use crate::ports::{DeviceApi, EventPublisher};
use crate::session::{Operation, SyncFailure, SyncSession, SyncStatus};

/// Polling period used by the original web UI.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Tunables for a [`DeviceSyncClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Period used when polling is restarted by a reload.
    pub poll_interval: Duration,
    /// Countdown run after a successful restart request.
    pub countdown: Countdown,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            countdown: Countdown::default(),
        }
    }
}

/// Result of [`DeviceSyncClient::submit_settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The charger stored the settings and the cache holds its copy.
    Saved {
        /// Wifi fields were edited; the charger must reboot to apply them.
        restart_required: bool,
    },
    /// The write or the follow-up read failed; the cache is unchanged.
    Failed,
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_saved(self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    #[must_use]
    pub fn restart_required(self) -> bool {
        matches!(
            self,
            Self::Saved {
                restart_required: true
            }
        )
    }
}

/// Handle on a charger sync session.
///
/// Cloning is cheap and every clone shares the same caches. The session ends
/// when the last handle is dropped: the polling task and any running
/// countdown are aborted.
pub struct DeviceSyncClient<A, P> {
    inner: Arc<Inner<A, P>>,
}

impl<A, P> Clone for DeviceSyncClient<A, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<A, P> {
    api: A,
    events: P,
    options: SyncOptions,
    session: SyncSession,
    state: watch::Sender<DeviceState>,
    settings: watch::Sender<DeviceSettings>,
    info: watch::Sender<DeviceInfo>,
    countdown: watch::Sender<Option<u32>>,
    wifi_dirty: AtomicBool,
    poll_interval: Mutex<Duration>,
    poller: Mutex<Option<JoinHandle<()>>>,
    countdown_task: Mutex<Option<JoinHandle<()>>>,
}

impl<A, P> Drop for Inner<A, P> {
    fn drop(&mut self) {
        let poller = self.poller.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = poller.take() {
            handle.abort();
            tracing::debug!("state polling stopped");
        }
        let countdown = self
            .countdown_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = countdown.take() {
            handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<A: DeviceApi, P> Inner<A, P> {
    async fn refresh_state(&self) {
        match self.api.fetch_state().await {
            Ok(state) => {
                self.state.send_replace(state);
            }
            Err(err) => {
                tracing::debug!(error = %err, "state poll failed, keeping previous state");
            }
        }
    }
}

impl<A, P> DeviceSyncClient<A, P>
where
    A: DeviceApi + 'static,
    P: EventPublisher + 'static,
{
    /// Create a client with default options. Caches start empty.
    pub fn new(api: A, events: P) -> Self {
        Self::with_options(api, events, SyncOptions::default())
    }

    /// Create a client with explicit options. Caches start empty.
    pub fn with_options(api: A, events: P, options: SyncOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                events,
                options,
                session: SyncSession::default(),
                state: watch::Sender::new(DeviceState::default()),
                settings: watch::Sender::new(DeviceSettings::default()),
                info: watch::Sender::new(DeviceInfo::default()),
                countdown: watch::Sender::new(None),
                wifi_dirty: AtomicBool::new(false),
                poll_interval: Mutex::new(options.poll_interval),
                poller: Mutex::new(None),
                countdown_task: Mutex::new(None),
            }),
        }
    }

    // -- cached documents ---------------------------------------------------

    /// Latest charger state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.inner.state.borrow().clone()
    }

    /// Working copy of the settings.
    #[must_use]
    pub fn settings(&self) -> DeviceSettings {
        self.inner.settings.borrow().clone()
    }

    /// Charger info as of the last initialize.
    #[must_use]
    pub fn info(&self) -> DeviceInfo {
        self.inner.info.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<DeviceState> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn subscribe_settings(&self) -> watch::Receiver<DeviceSettings> {
        self.inner.settings.subscribe()
    }

    #[must_use]
    pub fn subscribe_info(&self) -> watch::Receiver<DeviceInfo> {
        self.inner.info.subscribe()
    }

    /// Edit the working copy of the settings without contacting the charger.
    pub fn edit_settings(&self, edit: impl FnOnce(&mut DeviceSettings)) {
        self.inner.settings.send_modify(edit);
    }

    /// Mark whether wifi fields were edited since the last submit.
    ///
    /// The client never derives this flag itself; the caller owns it.
    pub fn set_wifi_dirty(&self, dirty: bool) {
        self.inner.wifi_dirty.store(dirty, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_wifi_dirty(&self) -> bool {
        self.inner.wifi_dirty.load(Ordering::SeqCst)
    }

    // -- busy/error envelope ------------------------------------------------

    /// Current busy/error envelope.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.inner.session.status()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status().is_loading()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<SyncFailure> {
        self.status().error()
    }

    #[must_use]
    pub fn subscribe_session(&self) -> watch::Receiver<SyncStatus> {
        self.inner.session.subscribe()
    }

    /// Seconds left before the post-restart reload, `None` when idle.
    #[must_use]
    pub fn countdown(&self) -> Option<u32> {
        *self.inner.countdown.borrow()
    }

    #[must_use]
    pub fn subscribe_countdown(&self) -> watch::Receiver<Option<u32>> {
        self.inner.countdown.subscribe()
    }

    // -- operations ---------------------------------------------------------

    /// Fetch state, settings and info concurrently.
    ///
    /// All three caches are replaced only if all three reads succeed;
    /// otherwise none is touched and the error marker is set.
    /// Returns whether the caches were populated.
    #[tracing::instrument(skip(self))]
    pub async fn initialize(&self) -> bool {
        let inner = &*self.inner;
        let busy = inner.session.begin(Operation::Initialize);

        let fetched = tokio::try_join!(
            inner.api.fetch_state(),
            inner.api.fetch_settings(),
            inner.api.fetch_info(),
        );

        match fetched {
            Ok((state, settings, info)) => {
                inner.state.send_replace(state);
                inner.settings.send_replace(settings);
                inner.info.send_replace(info);
                busy.succeed();
                inner.events.publish(SyncEvent::Initialized);
                tracing::info!("charger session initialized");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "initial fetch failed");
                busy.fail();
                false
            }
        }
    }

    /// Start (or restart) polling state every `interval`.
    ///
    /// The first read happens one interval after the call. Each tick issues
    /// its own request without waiting for the previous one, so responses may
    /// overlap; whichever arrives last wins. Failed ticks keep the previous
    /// state. Polling runs until the session ends.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_state_polling(&self, interval: Duration) {
        let interval = interval.max(Duration::from_millis(1));
        *lock(&self.inner.poll_interval) = interval;

        let handle = tokio::spawn(poll_state(Arc::downgrade(&self.inner), interval));
        if let Some(previous) = lock(&self.inner.poller).replace(handle) {
            previous.abort();
        }
        tracing::info!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "state polling started"
        );
    }

    /// Write `draft` to the charger, then re-read settings.
    ///
    /// On success the cache holds the charger's copy (not `draft`), the
    /// outcome reports whether the wifi-dirty flag was set, and the flag is
    /// cleared. On failure the cache and the flag are unchanged.
    #[tracing::instrument(skip(self, draft))]
    pub async fn submit_settings(&self, draft: &DeviceSettings) -> SubmitOutcome {
        let inner = &*self.inner;
        let busy = inner.session.begin(Operation::SubmitSettings);

        let stored = async {
            inner.api.write_settings(draft).await?;
            inner.api.fetch_settings().await
        }
        .await;

        match stored {
            Ok(settings) => {
                inner.settings.send_replace(settings);
                let restart_required = inner.wifi_dirty.swap(false, Ordering::SeqCst);
                busy.succeed();
                inner
                    .events
                    .publish(SyncEvent::SettingsSaved { restart_required });
                tracing::info!(restart_required, "settings saved");
                SubmitOutcome::Saved { restart_required }
            }
            Err(err) => {
                tracing::warn!(error = %err, "settings submit failed");
                busy.fail();
                SubmitOutcome::Failed
            }
        }
    }

    /// Re-read settings from the charger, discarding unsaved edits.
    ///
    /// Returns whether the cache was refreshed.
    #[tracing::instrument(skip(self))]
    pub async fn reset_settings(&self) -> bool {
        let inner = &*self.inner;
        let busy = inner.session.begin(Operation::ResetSettings);

        match inner.api.fetch_settings().await {
            Ok(settings) => {
                inner.settings.send_replace(settings);
                busy.succeed();
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "settings reset failed");
                busy.fail();
                false
            }
        }
    }

    /// Ask the charger to reboot after `delay`, then start the countdown.
    ///
    /// The countdown only starts when the charger accepted the request; it
    /// ends with a [`reload`](Self::reload). A second successful restart
    /// replaces a countdown that is still running. Returns whether the
    /// countdown started.
    ///
    /// Must be called from within a tokio runtime.
    #[tracing::instrument(skip(self))]
    pub async fn restart(&self, delay: Duration) -> bool {
        let inner = &*self.inner;
        let busy = inner.session.begin(Operation::Restart);
        let request = RestartRequest::after(delay);

        match inner.api.request_restart(request).await {
            Ok(()) => {
                inner
                    .events
                    .publish(SyncEvent::RestartScheduled { delay_ms: request.time });
                tracing::info!(delay_ms = request.time, "charger restart scheduled");
                self.start_countdown();
                busy.succeed();
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "restart request failed");
                busy.fail();
                false
            }
        }
    }

    /// Tear the session down and start over: empty caches, initialize,
    /// restart polling with the last interval used.
    ///
    /// Runs automatically when a post-restart countdown reaches zero.
    /// Returns whether the new initialize succeeded.
    pub async fn reload(&self) -> bool {
        let inner = &*self.inner;
        inner.events.publish(SyncEvent::Reloading);
        tracing::info!("reloading charger session");

        inner.state.send_replace(DeviceState::default());
        inner.settings.send_replace(DeviceSettings::default());
        inner.info.send_replace(DeviceInfo::default());
        inner.countdown.send_replace(None);
        inner.wifi_dirty.store(false, Ordering::SeqCst);

        let loaded = self.initialize().await;
        let interval = *lock(&inner.poll_interval);
        self.start_state_polling(interval);
        loaded
    }

    fn start_countdown(&self) {
        let countdown = self.inner.options.countdown;
        let session = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            let steps = session.clone();
            countdown
                .run(move |remaining| {
                    if let Some(inner) = steps.upgrade() {
                        inner.countdown.send_replace(Some(remaining));
                        inner.events.publish(SyncEvent::CountdownTick { remaining });
                    }
                })
                .await;

            if let Some(inner) = session.upgrade() {
                DeviceSyncClient { inner }.reload().await;
            }
        });

        if let Some(previous) = lock(&self.inner.countdown_task).replace(handle) {
            previous.abort();
        }
    }
}

async fn poll_state<A, P>(session: Weak<Inner<A, P>>, period: Duration)
where
    A: DeviceApi + 'static,
    P: EventPublisher + 'static,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let Some(inner) = session.upgrade() else {
            break;
        };
        tracing::trace!("polling charger state");
        tokio::spawn(async move {
            inner.refresh_state().await;
        });
    }
}
