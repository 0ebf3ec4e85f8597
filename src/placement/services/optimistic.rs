//! Optimistic placement protocol.
//!
//! A move is written to the task store before the server sees it. The
//! protocol for one proposal is:
//!
//! 1. acquire the task's guard, or drop the move if it is already held;
//! 2. snapshot the field the move writes;
//! 3. write the new value into the store;
//! 4. send the remote request;
//! 5. on success, replace the record with the server's version;
//! 6. on failure, restore the snapshot and report to the error surface;
//! 7. release the guard.

use crate::placement::{
    domain::{
        BoardScope, PlacementChange, PlacementFailure, Proposal, RejectionReason, SprintId, Task,
        TaskId, TaskStatus,
    },
    guard::ConcurrencyGuard,
    ports::{
        ErrorSurface, OperationId, PlacementNotice, SyncClient, SyncClientError, SyncClientResult,
    },
    store::{TaskStore, TaskStoreError, TaskStoreResult},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a placement attempt settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The gesture ended outside any container.
    Cancelled(TaskId),
    /// The move was legal but wrote nothing; no request was sent.
    Unchanged(TaskId),
    /// The transition rules refused the move; no request was sent.
    Rejected {
        /// Task that was dragged.
        task_id: TaskId,
        /// Rule that refused the move.
        reason: RejectionReason,
    },
    /// Another placement of the task was in flight; nothing was written.
    Dropped(TaskId),
    /// The server accepted the move. Holds the record now in the store.
    Confirmed(Task),
    /// The request failed and the store was restored.
    RolledBack(PlacementFailure),
}

impl PlacementOutcome {
    /// Returns the task the outcome concerns.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        match self {
            Self::Cancelled(task_id) | Self::Unchanged(task_id) | Self::Dropped(task_id) => {
                *task_id
            }
            Self::Rejected { task_id, .. } => *task_id,
            Self::Confirmed(task) => task.id(),
            Self::RolledBack(failure) => failure.task_id(),
        }
    }
}

/// The two remote writes a proposal can need.
#[derive(Debug, Clone, Copy)]
enum RemoteWrite {
    Status(TaskStatus),
    Sprint(Option<SprintId>),
}

impl RemoteWrite {
    const fn from_change(change: PlacementChange) -> Option<Self> {
        match change {
            PlacementChange::Unchanged => None,
            PlacementChange::Status(status) => Some(Self::Status(status)),
            PlacementChange::Sprint(sprint_id) => Some(Self::Sprint(sprint_id)),
        }
    }
}

/// Applies proposals optimistically and reconciles them with the server.
pub struct OptimisticUpdater<S, E, C>
where
    S: SyncClient,
    E: ErrorSurface,
    C: Clock + Send + Sync,
{
    store: TaskStore,
    guard: ConcurrencyGuard,
    client: Arc<S>,
    surface: Arc<E>,
    clock: Arc<C>,
}

impl<S, E, C> Clone for OptimisticUpdater<S, E, C>
where
    S: SyncClient,
    E: ErrorSurface,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            guard: self.guard.clone(),
            client: Arc::clone(&self.client),
            surface: Arc::clone(&self.surface),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, E, C> OptimisticUpdater<S, E, C>
where
    S: SyncClient,
    E: ErrorSurface,
    C: Clock + Send + Sync,
{
    /// Creates an updater over a shared store and guard.
    #[must_use]
    pub const fn new(
        store: TaskStore,
        guard: ConcurrencyGuard,
        client: Arc<S>,
        surface: Arc<E>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            store,
            guard,
            client,
            surface,
            clock,
        }
    }

    /// Returns the store the updater writes to.
    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Returns the guard serializing placements.
    #[must_use]
    pub const fn guard(&self) -> &ConcurrencyGuard {
        &self.guard
    }

    /// Runs the optimistic protocol for one proposal.
    ///
    /// Remote failures never surface as `Err`: they are rolled back, reported
    /// to the error surface and returned as [`PlacementOutcome::RolledBack`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task is not loaded and
    /// [`TaskStoreError::Poisoned`] when the store lock is poisoned. In both
    /// cases no request is sent and the guard is released.
    pub async fn apply(
        &self,
        scope: &BoardScope,
        proposal: Proposal,
    ) -> TaskStoreResult<PlacementOutcome> {
        let task_id = proposal.task_id;
        let Some(write) = RemoteWrite::from_change(proposal.change) else {
            return Ok(PlacementOutcome::Unchanged(task_id));
        };
        let Some(permit) = self.guard.try_acquire(task_id) else {
            debug!(%task_id, "placement already in flight, dropping move");
            return Ok(PlacementOutcome::Dropped(task_id));
        };

        let current = self
            .store
            .get(task_id)?
            .ok_or(TaskStoreError::NotFound(task_id))?;
        let rollback = proposal.change.snapshot_of(&current);
        self.store.apply_change(task_id, proposal.change)?;

        let operation_id = OperationId::new();
        debug!(
            %operation_id,
            %task_id,
            source = %proposal.source,
            destination = %proposal.destination,
            "optimistic placement written"
        );

        let outcome = match self.send(scope, task_id, write).await {
            Ok(confirmed) => self.confirm(operation_id, confirmed)?,
            Err(err) => {
                let failure = PlacementFailure::new(
                    task_id,
                    err.category(),
                    proposal.change,
                    rollback,
                    err.to_string(),
                );
                self.roll_back(operation_id, &failure)?;
                PlacementOutcome::RolledBack(failure)
            }
        };
        permit.release();
        Ok(outcome)
    }

    /// Sends the write and checks that the answer describes the same task.
    async fn send(
        &self,
        scope: &BoardScope,
        task_id: TaskId,
        write: RemoteWrite,
    ) -> SyncClientResult<Task> {
        let confirmed = match write {
            RemoteWrite::Status(status) => self.client.update_status(scope, task_id, status).await,
            RemoteWrite::Sprint(sprint_id) => {
                self.client
                    .update_sprint_assignment(scope, task_id, sprint_id)
                    .await
            }
        }?;
        if confirmed.id() != task_id {
            return Err(SyncClientError::MismatchedRecord {
                requested: task_id,
                returned: confirmed.id(),
            });
        }
        Ok(confirmed)
    }

    /// Keeps the optimistic value, letting the server's record win.
    fn confirm(
        &self,
        operation_id: OperationId,
        confirmed: Task,
    ) -> TaskStoreResult<PlacementOutcome> {
        let task_id = confirmed.id();
        if !self.store.replace_if_present(confirmed.clone())? {
            debug!(%operation_id, %task_id, "task removed locally while in flight");
        }
        info!(%operation_id, %task_id, "placement confirmed");
        Ok(PlacementOutcome::Confirmed(confirmed))
    }

    /// Restores the snapshot, then reports the failure.
    fn roll_back(
        &self,
        operation_id: OperationId,
        failure: &PlacementFailure,
    ) -> TaskStoreResult<()> {
        let task_id = failure.task_id();
        match self.store.apply_change(task_id, failure.restored()) {
            Ok(_) | Err(TaskStoreError::NotFound(_)) => {}
            Err(err) => return Err(err),
        }
        warn!(
            %operation_id,
            %task_id,
            category = %failure.category(),
            detail = failure.detail(),
            "placement rolled back"
        );
        self.surface.report(PlacementNotice::from_failure(
            operation_id,
            failure,
            self.clock.utc(),
        ));
        Ok(())
    }
}
