//! Failure taxonomy for placement operations.

use super::{PlacementChange, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a placement failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// The transition rules refused the move; no request was made.
    ValidationRejected,
    /// Another placement of the same task is in flight; the move was dropped.
    GuardRefused,
    /// Network unreachable, timeout, or a non-2xx response.
    TransportFailure,
    /// The task no longer exists on the server.
    NotFound,
    /// The server failed with a 5xx status.
    ServerError,
}

impl FailureCategory {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationRejected => "validation_rejected",
            Self::GuardRefused => "guard_refused",
            Self::TransportFailure => "transport_failure",
            Self::NotFound => "not_found",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote placement failure after its optimistic write was rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementFailure {
    task_id: TaskId,
    category: FailureCategory,
    attempted: PlacementChange,
    restored: PlacementChange,
    detail: String,
}

impl PlacementFailure {
    /// Creates a failure record.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        category: FailureCategory,
        attempted: PlacementChange,
        restored: PlacementChange,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            category,
            attempted,
            restored,
            detail: detail.into(),
        }
    }

    /// Returns the task whose move failed.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn category(&self) -> FailureCategory {
        self.category
    }

    /// Returns the change that was attempted.
    #[must_use]
    pub const fn attempted(&self) -> PlacementChange {
        self.attempted
    }

    /// Returns the value the task was restored to.
    #[must_use]
    pub const fn restored(&self) -> PlacementChange {
        self.restored
    }

    /// Returns the technical detail of the underlying error.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns `true` when the board should reload its task list.
    #[must_use]
    pub const fn requires_refresh(&self) -> bool {
        matches!(self.category, FailureCategory::NotFound)
    }

    /// Returns the message shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.category {
            FailureCategory::NotFound => format!(
                "Task {} could not be updated; it may have been removed. Refresh the board to see the latest tasks.",
                self.task_id
            ),
            FailureCategory::ServerError => format!(
                "The server had a temporary problem updating task {}. The move was undone; please try again.",
                self.task_id
            ),
            FailureCategory::TransportFailure
            | FailureCategory::ValidationRejected
            | FailureCategory::GuardRefused => format!(
                "Task {} could not be updated. The move was undone; check your connection and try again.",
                self.task_id
            ),
        }
    }
}

impl fmt::Display for PlacementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for task {}: {}",
            self.category, self.task_id, self.detail
        )
    }
}
