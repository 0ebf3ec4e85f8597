//! Error surface that keeps notices for the UI to poll.

use crate::placement::ports::{ErrorSurface, PlacementNotice};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Collects placement notices in arrival order.
#[derive(Debug, Clone, Default)]
pub struct CollectingErrorSurface {
    notices: Arc<Mutex<Vec<PlacementNotice>>>,
}

impl CollectingErrorSurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PlacementNotice>> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns every pending notice without removing it.
    #[must_use]
    pub fn notices(&self) -> Vec<PlacementNotice> {
        self.lock().clone()
    }

    /// Returns the most recent notice.
    #[must_use]
    pub fn latest(&self) -> Option<PlacementNotice> {
        self.lock().last().cloned()
    }

    /// Removes and returns every pending notice.
    #[must_use]
    pub fn drain(&self) -> Vec<PlacementNotice> {
        std::mem::take(&mut *self.lock())
    }
}

impl ErrorSurface for CollectingErrorSurface {
    fn report(&self, notice: PlacementNotice) {
        self.lock().push(notice);
    }
}
