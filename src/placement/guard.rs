//! Per-task mutual exclusion for placement requests.

use crate::placement::domain::TaskId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Tracks which tasks have a placement request in flight.
///
/// Clones share the same set. A task id is held for exactly as long as its
/// [`PlacementPermit`] is alive.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyGuard {
    in_flight: Arc<Mutex<HashSet<TaskId>>>,
}

impl ConcurrencyGuard {
    /// Creates a guard with nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // The set stays consistent even if a holder panicked: every mutation is a
    // single insert or remove.
    fn lock(&self) -> MutexGuard<'_, HashSet<TaskId>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims `task_id`, returning `None` when it is already held.
    #[must_use]
    pub fn try_acquire(&self, task_id: TaskId) -> Option<PlacementPermit> {
        if !self.lock().insert(task_id) {
            trace!(%task_id, "placement guard refused");
            return None;
        }
        trace!(%task_id, "placement guard acquired");
        Some(PlacementPermit {
            task_id,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Returns `true` while a request for `task_id` is outstanding.
    #[must_use]
    pub fn is_in_flight(&self, task_id: TaskId) -> bool {
        self.lock().contains(&task_id)
    }

    /// Returns every task with an outstanding request.
    #[must_use]
    pub fn in_flight(&self) -> HashSet<TaskId> {
        self.lock().clone()
    }
}

/// Proof that a task's placement is held. Dropping it releases the task.
#[derive(Debug)]
#[must_use = "dropping the permit releases the task immediately"]
pub struct PlacementPermit {
    task_id: TaskId,
    in_flight: Arc<Mutex<HashSet<TaskId>>>,
}

impl PlacementPermit {
    /// Returns the held task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Releases the task now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for PlacementPermit {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.task_id);
        trace!(task_id = %self.task_id, "placement guard released");
    }
}
