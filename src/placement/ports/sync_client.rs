//! Remote system-of-record port for task placement.

use crate::placement::domain::{
    BoardScope, FailureCategory, Sprint, SprintId, Task, TaskId, TaskStatus,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for sync client operations.
pub type SyncClientResult<T> = Result<T, SyncClientError>;

/// Remote operations the placement engine consumes.
///
/// Every call is scoped to a project and template. Placement updates return
/// the server's authoritative record.
#[async_trait]
pub trait SyncClient: Send + Sync {
    /// Changes a task's status.
    ///
    /// # Errors
    ///
    /// Returns [`SyncClientError`] when the request fails.
    async fn update_status(
        &self,
        scope: &BoardScope,
        task_id: TaskId,
        status: TaskStatus,
    ) -> SyncClientResult<Task>;

    /// Changes a task's sprint membership. `None` returns it to the backlog.
    ///
    /// # Errors
    ///
    /// Returns [`SyncClientError`] when the request fails.
    async fn update_sprint_assignment(
        &self,
        scope: &BoardScope,
        task_id: TaskId,
        sprint_id: Option<SprintId>,
    ) -> SyncClientResult<Task>;

    /// Lists every task of the project.
    ///
    /// # Errors
    ///
    /// Returns [`SyncClientError`] when the request fails.
    async fn list_tasks(&self, scope: &BoardScope) -> SyncClientResult<Vec<Task>>;

    /// Returns the project's latest sprint, which is the active one.
    ///
    /// # Errors
    ///
    /// Returns [`SyncClientError`] when the request fails.
    async fn latest_sprint(&self, scope: &BoardScope) -> SyncClientResult<Option<Sprint>>;
}

/// Errors returned by sync client adapters.
#[derive(Debug, Clone, Error)]
pub enum SyncClientError {
    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The task does not exist on the server.
    #[error("task not found on server: {0}")]
    NotFound(TaskId),

    /// The server failed with a 5xx status.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The server refused the request with a non-2xx, non-5xx status.
    #[error("request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The server answered a placement with the record of another task.
    #[error("requested task {requested} but the server returned task {returned}")]
    MismatchedRecord {
        /// Task the request targeted.
        requested: TaskId,
        /// Task named by the response body.
        returned: TaskId,
    },

    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl SyncClientError {
    /// Wraps a transport-level error.
    #[must_use]
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Maps the error onto the placement failure taxonomy.
    #[must_use]
    pub const fn category(&self) -> FailureCategory {
        match self {
            Self::NotFound(_) => FailureCategory::NotFound,
            Self::Server { .. } => FailureCategory::ServerError,
            Self::Timeout
            | Self::Rejected { .. }
            | Self::MismatchedRecord { .. }
            | Self::Transport(_) => {
                FailureCategory::TransportFailure
            }
        }
    }
}
