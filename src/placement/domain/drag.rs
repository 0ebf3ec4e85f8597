//! Drag gesture state machine.
//!
//! A [`DragCoordinator`] tracks one gesture at a time and turns its end into
//! a validated [`Proposal`], a rejection, or nothing at all.

use super::{
    Container, PlacementChange, PlacementDomainError, PlacementPolicy, Proposal, RejectionReason,
    SprintContext, Task, TaskId, Verdict, validate,
};
use thiserror::Error;
use tracing::debug;

const TASK_PAYLOAD_PREFIX: &str = "task-";

/// Decodes the draggable identity carried by a gesture.
///
/// Accepts a bare id (`"12"`) or the prefixed form (`"task-12"`).
///
/// # Errors
///
/// Returns [`PlacementDomainError::MalformedDragPayload`] when the payload is
/// not a positive integer after stripping the prefix.
pub fn parse_drag_payload(raw: &str) -> Result<TaskId, PlacementDomainError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .get(..TASK_PAYLOAD_PREFIX.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(TASK_PAYLOAD_PREFIX))
        .and_then(|_| trimmed.get(TASK_PAYLOAD_PREFIX.len()..))
        .unwrap_or(trimmed);
    let value: u64 = digits
        .parse()
        .map_err(|_| PlacementDomainError::MalformedDragPayload(raw.to_owned()))?;
    TaskId::new(value).map_err(|_| PlacementDomainError::MalformedDragPayload(raw.to_owned()))
}

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A task is being dragged.
    Dragging {
        /// Dragged task.
        task_id: TaskId,
        /// Container the drag started in.
        source: Container,
    },
    /// The gesture ended over a container and is being validated.
    Resolving {
        /// Dragged task.
        task_id: TaskId,
        /// Container the drag started in.
        source: Container,
        /// Container the task was dropped on.
        destination: Container,
    },
}

/// How a finished gesture resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragResolution {
    /// Released outside any container; nothing proposed.
    Cancelled {
        /// Dragged task.
        task_id: TaskId,
    },
    /// Legal move that writes nothing.
    Unchanged {
        /// Dragged task.
        task_id: TaskId,
    },
    /// Illegal move; the card snaps back to `source`.
    Rejected {
        /// Dragged task.
        task_id: TaskId,
        /// Container the card returns to.
        source: Container,
        /// Rule that refused the move.
        reason: RejectionReason,
    },
    /// Legal move with a field write.
    Proposed(Proposal),
}

/// Errors raised by misuse of the gesture state machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DragError {
    /// A gesture is already in progress.
    #[error("a drag of task {0} is already in progress")]
    AlreadyDragging(TaskId),

    /// No gesture is in progress.
    #[error("no drag is in progress")]
    NotDragging,

    /// The drag payload could not be decoded.
    #[error(transparent)]
    Payload(#[from] PlacementDomainError),

    /// The dragged task is not in the task store.
    #[error("dragged task {0} is not loaded")]
    UnknownTask(TaskId),
}

/// Tracks a single drag gesture.
#[derive(Debug, Default)]
pub struct DragCoordinator {
    state: DragState,
}

impl DragCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    /// Starts a gesture for the task named by `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::AlreadyDragging`] when a gesture is in progress
    /// and [`DragError::Payload`] when the payload is malformed.
    pub fn begin(&mut self, payload: &str, source: Container) -> Result<TaskId, DragError> {
        if let DragState::Dragging { task_id, .. } | DragState::Resolving { task_id, .. } =
            self.state
        {
            return Err(DragError::AlreadyDragging(task_id));
        }
        let task_id = parse_drag_payload(payload)?;
        debug!(%task_id, source = %source, "drag started");
        self.state = DragState::Dragging { task_id, source };
        Ok(task_id)
    }

    /// Abandons the current gesture without proposing anything.
    ///
    /// Returns the dragged task, or `None` when no gesture was in progress.
    pub fn cancel(&mut self) -> Option<TaskId> {
        let previous = std::mem::take(&mut self.state);
        match previous {
            DragState::Dragging { task_id, .. } | DragState::Resolving { task_id, .. } => {
                debug!(%task_id, "drag cancelled");
                Some(task_id)
            }
            DragState::Idle => None,
        }
    }

    /// Moves the source of the gesture in progress to `current`, for a task
    /// whose container changed while it was being dragged.
    pub const fn rebase(&mut self, current: Container) {
        if let DragState::Dragging { source, .. } = &mut self.state {
            *source = current;
        }
    }

    /// Ends the gesture over `destination` (or over nothing) and validates
    /// the move. The coordinator is idle again afterwards, whatever the
    /// result.
    ///
    /// `lookup` resolves the dragged task's current record.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::NotDragging`] when no gesture is in progress and
    /// [`DragError::UnknownTask`] when `lookup` finds nothing.
    pub fn finish<F>(
        &mut self,
        destination: Option<Container>,
        context: &SprintContext,
        policy: &PlacementPolicy,
        lookup: F,
    ) -> Result<DragResolution, DragError>
    where
        F: FnOnce(TaskId) -> Option<Task>,
    {
        let DragState::Dragging { task_id, source } = std::mem::take(&mut self.state) else {
            return Err(DragError::NotDragging);
        };
        let Some(target) = destination else {
            debug!(%task_id, "drag released outside any container");
            return Ok(DragResolution::Cancelled { task_id });
        };

        self.state = DragState::Resolving {
            task_id,
            source,
            destination: target,
        };
        let resolution = resolve(task_id, source, target, context, policy, lookup);
        self.state = DragState::Idle;
        resolution
    }
}

fn resolve<F>(
    task_id: TaskId,
    source: Container,
    destination: Container,
    context: &SprintContext,
    policy: &PlacementPolicy,
    lookup: F,
) -> Result<DragResolution, DragError>
where
    F: FnOnce(TaskId) -> Option<Task>,
{
    let task = lookup(task_id).ok_or(DragError::UnknownTask(task_id))?;
    let resolution = match validate(&task, source, destination, context, policy) {
        Verdict::Allowed(PlacementChange::Unchanged) => DragResolution::Unchanged { task_id },
        Verdict::Allowed(change) => DragResolution::Proposed(Proposal {
            task_id,
            source,
            destination,
            change,
        }),
        Verdict::Rejected(reason) => {
            debug!(%task_id, %reason, "drop rejected");
            DragResolution::Rejected {
                task_id,
                source,
                reason,
            }
        }
    };
    Ok(resolution)
}
