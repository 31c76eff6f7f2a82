//! Shared application state for axum handlers.

use std::sync::Arc;

use evsedash_app::ports::DeviceApi;

/// State shared across all axum handlers.
///
/// Generic over the charger to avoid dynamic dispatch. `Clone` is implemented
/// manually so the charger itself does not need to be `Clone`.
pub struct AppState<D> {
    /// Charger answering the API calls.
    pub charger: Arc<D>,
}

impl<D> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            charger: Arc::clone(&self.charger),
        }
    }
}

impl<D: DeviceApi + 'static> AppState<D> {
    /// Wrap a charger.
    pub fn new(charger: D) -> Self {
        Self::from_arc(Arc::new(charger))
    }

    /// Share a charger that background tasks (e.g. a ticker) also hold.
    pub fn from_arc(charger: Arc<D>) -> Self {
        Self { charger }
    }
}
