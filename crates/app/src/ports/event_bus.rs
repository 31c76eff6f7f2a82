//! Event bus port — one-shot notifications for a presentation layer.

use evsedash_domain::event::SyncEvent;

/// Publishes sync events to interested subscribers.
///
/// Publishing never fails from the caller's point of view: an event nobody
/// listens to is simply dropped.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: SyncEvent);
}

impl<T: EventPublisher> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: SyncEvent) {
        (**self).publish(event);
    }
}
