//! Port through which placement failures reach the user.

use crate::placement::domain::{FailureCategory, PlacementFailure, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one placement attempt, used to correlate logs and notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Creates a new random operation identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recoverable, user-visible failure report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementNotice {
    /// Placement attempt that failed.
    pub operation_id: OperationId,
    /// Task whose move failed.
    pub task_id: TaskId,
    /// Failure category.
    pub category: FailureCategory,
    /// Message to show.
    pub message: String,
    /// Whether the board should reload its task list.
    pub requires_refresh: bool,
    /// When the failure settled.
    pub occurred_at: DateTime<Utc>,
}

impl PlacementNotice {
    /// Builds a notice from a rolled-back failure.
    #[must_use]
    pub fn from_failure(
        operation_id: OperationId,
        failure: &PlacementFailure,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            operation_id,
            task_id: failure.task_id(),
            category: failure.category(),
            message: failure.user_message(),
            requires_refresh: failure.requires_refresh(),
            occurred_at,
        }
    }
}

/// Receiver of placement failures.
///
/// Reports arrive after the task store has already been rolled back.
pub trait ErrorSurface: Send + Sync {
    /// Records a failure for display.
    fn report(&self, notice: PlacementNotice);
}
