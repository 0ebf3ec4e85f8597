//! Board orchestration service.
//!
//! Provides [`BoardService`], which owns the state of one open board: the
//! task store, the sprint context, the drag gesture and the concurrency
//! guard. Drops are validated here and handed to the
//! [`OptimisticUpdater`].

use super::optimistic::{OptimisticUpdater, PlacementOutcome};
use crate::placement::{
    domain::{
        BoardScope, BoardView, Container, DragCoordinator, DragError, DragResolution, DragState,
        PlacementPolicy, Proposal, Sprint, SprintContext, SprintId, Task, TaskId, Verdict,
        classify, parse_drag_payload, validate,
    },
    guard::ConcurrencyGuard,
    ports::{ErrorSurface, SyncClient, SyncClientError},
    store::{BoardLayout, TaskStore, TaskStoreError},
};
use mockable::Clock;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for board operations.
#[derive(Debug, Error)]
pub enum BoardServiceError {
    /// The task store failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
    /// The drag gesture was misused.
    #[error(transparent)]
    Drag(#[from] DragError),
    /// Loading from the server failed.
    #[error(transparent)]
    Sync(#[from] SyncClientError),
    /// The task type cannot be dragged.
    #[error("task {0} cannot be dragged")]
    NotDraggable(TaskId),
    /// The task is loaded but not shown on the current surface.
    #[error("task {0} is not on the board")]
    NotOnBoard(TaskId),
}

/// Result type for board service operations.
pub type BoardServiceResult<T> = Result<T, BoardServiceError>;

/// State and operations of one open board.
pub struct BoardService<S, E, C>
where
    S: SyncClient,
    E: ErrorSurface,
    C: Clock + Send + Sync,
{
    scope: BoardScope,
    policy: PlacementPolicy,
    client: Arc<S>,
    updater: OptimisticUpdater<S, E, C>,
    context: RwLock<SprintContext>,
    drag: Mutex<DragCoordinator>,
}

impl<S, E, C> BoardService<S, E, C>
where
    S: SyncClient,
    E: ErrorSurface,
    C: Clock + Send + Sync,
{
    /// Creates a board with an empty store and no active sprint.
    #[must_use]
    pub fn new(
        scope: BoardScope,
        view: BoardView,
        policy: PlacementPolicy,
        client: Arc<S>,
        surface: Arc<E>,
        clock: Arc<C>,
    ) -> Self {
        let updater = OptimisticUpdater::new(
            TaskStore::new(),
            ConcurrencyGuard::new(),
            Arc::clone(&client),
            surface,
            clock,
        );
        Self {
            scope,
            policy,
            client,
            updater,
            context: RwLock::new(SprintContext::new(view, None)),
            drag: Mutex::new(DragCoordinator::new()),
        }
    }

    /// Returns the project and template the board shows.
    #[must_use]
    pub const fn scope(&self) -> &BoardScope {
        &self.scope
    }

    /// Returns the transition policy.
    #[must_use]
    pub const fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    /// Returns the task store. Clones share state with the board.
    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        self.updater.store()
    }

    /// Returns the concurrency guard.
    #[must_use]
    pub const fn guard(&self) -> &ConcurrencyGuard {
        self.updater.guard()
    }

    /// Returns the current sprint context.
    #[must_use]
    pub fn context(&self) -> SprintContext {
        *self.context.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switches the drop surface.
    pub fn set_view(&self, view: BoardView) {
        let mut context = self.context.write().unwrap_or_else(PoisonError::into_inner);
        *context = SprintContext::new(view, context.active_sprint());
    }

    /// Returns the state of the drag gesture.
    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.lock_drag().state()
    }

    /// Groups the loaded tasks for rendering.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Store`] when the store lock is poisoned.
    pub fn layout(&self) -> BoardServiceResult<BoardLayout> {
        Ok(self.store().layout(&self.context())?)
    }

    /// Reloads the active sprint from the server.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Sync`] when the request fails. The
    /// previous context is kept.
    pub async fn refresh_active_sprint(&self) -> BoardServiceResult<Option<Sprint>> {
        let sprint = self.client.latest_sprint(&self.scope).await?;
        let active = sprint.as_ref().map(Sprint::id);
        {
            let mut context = self.context.write().unwrap_or_else(PoisonError::into_inner);
            *context = context.with_active_sprint(active);
        }
        debug!(active_sprint = ?active.map(SprintId::value), "active sprint refreshed");
        Ok(sprint)
    }

    /// Reloads the task list, keeping the local record of every task with
    /// a placement in flight. Returns the number of loaded tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Sync`] when the request fails and
    /// [`BoardServiceError::Store`] when the store lock is poisoned.
    pub async fn refresh_tasks(&self) -> BoardServiceResult<usize> {
        let tasks = self.client.list_tasks(&self.scope).await?;
        let in_flight = self.guard().in_flight();
        self.store().reload(tasks, &in_flight)?;
        let loaded = self.store().len()?;
        info!(loaded, preserved = in_flight.len(), "task list refreshed");
        Ok(loaded)
    }

    /// Loads the active sprint and the task list, then returns the layout.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Self::refresh_active_sprint`] or
    /// [`Self::refresh_tasks`].
    pub async fn load(&self) -> BoardServiceResult<BoardLayout> {
        self.refresh_active_sprint().await?;
        self.refresh_tasks().await?;
        self.layout()
    }

    /// Starts dragging the task named by `payload`.
    ///
    /// `source` is the container the caller rendered the card in. The
    /// gesture starts from the task's classified container, which wins when
    /// the two disagree.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Drag`] for a malformed payload, an
    /// unloaded task or a gesture already in progress,
    /// [`BoardServiceError::NotDraggable`] for an Epic task and
    /// [`BoardServiceError::NotOnBoard`] for a task the current surface
    /// does not show.
    pub fn begin_drag(&self, payload: &str, source: Container) -> BoardServiceResult<TaskId> {
        let task_id = parse_drag_payload(payload).map_err(DragError::from)?;
        let task = self
            .store()
            .get(task_id)?
            .ok_or(DragError::UnknownTask(task_id))?;
        if task.is_epic() {
            return Err(BoardServiceError::NotDraggable(task_id));
        }
        let current =
            classify(&task, &self.context()).ok_or(BoardServiceError::NotOnBoard(task_id))?;
        if current != source {
            debug!(%task_id, claimed = %source, %current, "drag source corrected");
        }
        Ok(self.lock_drag().begin(payload, current)?)
    }

    /// Abandons the current gesture, returning the task that was dragged.
    #[must_use]
    pub fn cancel_drag(&self) -> Option<TaskId> {
        self.lock_drag().cancel()
    }

    /// Ends the gesture over `destination`, or over nothing when `None`, and
    /// settles the resulting move.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Drag`] when no gesture is in progress or
    /// the dragged task has been unloaded, [`BoardServiceError::NotOnBoard`]
    /// when the task left the surface during the gesture, and
    /// [`BoardServiceError::Store`] when the store lock is poisoned.
    pub async fn finish_drag(
        &self,
        destination: Option<Container>,
    ) -> BoardServiceResult<PlacementOutcome> {
        let context = self.context();
        let resolution = {
            let mut drag = self.lock_drag();
            let dragged = self.dragged_record(&mut drag, &context, destination.is_some())?;
            drag.finish(destination, &context, &self.policy, |_| dragged)?
        };

        match resolution {
            DragResolution::Cancelled { task_id } => Ok(PlacementOutcome::Cancelled(task_id)),
            DragResolution::Unchanged { task_id } => Ok(PlacementOutcome::Unchanged(task_id)),
            DragResolution::Rejected {
                task_id, reason, ..
            } => Ok(PlacementOutcome::Rejected { task_id, reason }),
            DragResolution::Proposed(proposal) => self.settle(proposal).await,
        }
    }

    /// Moves a task to `destination` without a gesture, validating it the
    /// same way a drop is validated.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Store`] when the task is not loaded and
    /// [`BoardServiceError::NotOnBoard`] when it is not shown on the current
    /// surface.
    pub async fn move_task(
        &self,
        task_id: TaskId,
        destination: Container,
    ) -> BoardServiceResult<PlacementOutcome> {
        let context = self.context();
        let task = self
            .store()
            .get(task_id)?
            .ok_or(TaskStoreError::NotFound(task_id))?;
        let source = classify(&task, &context).ok_or(BoardServiceError::NotOnBoard(task_id))?;

        match validate(&task, source, destination, &context, &self.policy) {
            Verdict::Rejected(reason) => Ok(PlacementOutcome::Rejected { task_id, reason }),
            Verdict::Allowed(change) if change.is_unchanged() => {
                Ok(PlacementOutcome::Unchanged(task_id))
            }
            Verdict::Allowed(change) => {
                self.settle(Proposal {
                    task_id,
                    source,
                    destination,
                    change,
                })
                .await
            }
        }
    }

    /// Looks up the dragged task and, for a drop, lines the gesture's
    /// source up with the container the task is in now. Any failure ends
    /// the gesture.
    fn dragged_record(
        &self,
        drag: &mut DragCoordinator,
        context: &SprintContext,
        dropped: bool,
    ) -> BoardServiceResult<Option<Task>> {
        let DragState::Dragging { task_id, source } = drag.state() else {
            return Ok(None);
        };
        let task = match self.store().get(task_id) {
            Ok(task) => task,
            Err(err) => {
                drag.cancel();
                return Err(err.into());
            }
        };
        let Some(record) = task.as_ref().filter(|_| dropped) else {
            return Ok(task);
        };
        let Some(current) = classify(record, context) else {
            drag.cancel();
            return Err(BoardServiceError::NotOnBoard(task_id));
        };
        if current != source {
            debug!(%task_id, %source, %current, "dragged task moved during the gesture");
            drag.rebase(current);
        }
        Ok(task)
    }

    async fn settle(&self, proposal: Proposal) -> BoardServiceResult<PlacementOutcome> {
        Ok(self.updater.apply(&self.scope, proposal).await?)
    }

    fn lock_drag(&self) -> MutexGuard<'_, DragCoordinator> {
        self.drag.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
