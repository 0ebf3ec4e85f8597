//! Placement transition rules.
//!
//! [`validate`] is the single place that decides whether a task may move
//! from one container to another and which field the move writes. It is a
//! pure function of the task, the two containers, the sprint context and the
//! board policy.

use super::{Container, SprintContext, SprintId, Task, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The field write a legal move produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "value")]
pub enum PlacementChange {
    /// The move is legal but writes nothing (reorder, or a derived
    /// container such as Approvals).
    Unchanged,
    /// The task's status becomes the given value.
    Status(TaskStatus),
    /// The task's sprint membership becomes the given value.
    Sprint(Option<SprintId>),
}

impl PlacementChange {
    /// Returns `true` when nothing is written.
    #[must_use]
    pub const fn is_unchanged(self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Captures the task's current value of the field this change writes.
    ///
    /// Applying the returned change restores the task to its pre-move
    /// placement.
    #[must_use]
    pub const fn snapshot_of(self, task: &Task) -> Self {
        match self {
            Self::Unchanged => Self::Unchanged,
            Self::Status(_) => Self::Status(task.status()),
            Self::Sprint(_) => Self::Sprint(task.sprint_id()),
        }
    }
}

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Epic tasks cannot be moved at all.
    EpicImmovable,
    /// Only Epic tasks may occupy the Epic container.
    EpicContainerReserved,
    /// Only Approval tasks may enter the Approvals container.
    ApprovalsReserved,
    /// Approval tasks stay in the Approvals container on this board.
    ApprovalConfined,
    /// Moving into the sprint needs an active sprint.
    NoActiveSprint,
    /// The two containers belong to different drop surfaces.
    IncompatibleContainers {
        /// Container the drag started in.
        source: Container,
        /// Container the task was dropped on.
        destination: Container,
    },
}

impl RejectionReason {
    /// Returns the user-facing message naming the violated rule.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EpicImmovable => f.write_str("Epic tasks cannot be moved"),
            Self::EpicContainerReserved => {
                f.write_str("Only Epic-type tasks may occupy the Epic column")
            }
            Self::ApprovalsReserved => f.write_str("Only Approval-type tasks may enter Approvals"),
            Self::ApprovalConfined => {
                f.write_str("Approval tasks must stay in the Approvals column")
            }
            Self::NoActiveSprint => f.write_str("There is no active sprint to move the task into"),
            Self::IncompatibleContainers {
                source,
                destination,
            } => write!(
                f,
                "Tasks cannot be moved from {} to {}",
                source.label(),
                destination.label()
            ),
        }
    }
}

/// Outcome of validating a proposed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The move is legal and writes the given change.
    Allowed(PlacementChange),
    /// The move is illegal.
    Rejected(RejectionReason),
}

impl Verdict {
    /// Returns `true` for [`Verdict::Allowed`].
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }
}

/// Board-level switches that tighten the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementPolicy {
    /// When set, Approval tasks may not be dropped into status columns.
    pub confine_approvals: bool,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            confine_approvals: true,
        }
    }
}

/// A validated move with a concrete field write, ready for the optimistic
/// updater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal {
    /// Task being moved.
    pub task_id: TaskId,
    /// Container the drag started in.
    pub source: Container,
    /// Container the task was dropped on.
    pub destination: Container,
    /// Field write to apply.
    pub change: PlacementChange,
}

/// Decides whether `task` may move from `source` to `destination`.
///
/// Rules are evaluated in order and the first match wins:
///
/// 1. Same container: allowed, nothing written.
/// 2. Epic tasks never move.
/// 3. Nothing else may enter the Epic container.
/// 4. Only Approval tasks may enter Approvals.
/// 5. Confined Approval tasks may not enter status columns.
/// 6. Backlog and Sprint swap sprint membership for any type.
/// 7. Status columns (and Approvals when not confined) move into status
///    columns by writing the destination status.
/// 8. Approval tasks entering Approvals write nothing.
/// 9. Anything else crosses drop surfaces and is refused.
#[must_use]
pub fn validate(
    task: &Task,
    source: Container,
    destination: Container,
    context: &SprintContext,
    policy: &PlacementPolicy,
) -> Verdict {
    if source == destination {
        return Verdict::Allowed(PlacementChange::Unchanged);
    }
    if task.is_epic() {
        return Verdict::Rejected(RejectionReason::EpicImmovable);
    }
    if destination == Container::Epic {
        return Verdict::Rejected(RejectionReason::EpicContainerReserved);
    }
    if destination == Container::Approvals && !task.is_approval() {
        return Verdict::Rejected(RejectionReason::ApprovalsReserved);
    }
    if destination.is_status_column() && task.is_approval() && policy.confine_approvals {
        return Verdict::Rejected(RejectionReason::ApprovalConfined);
    }

    match (source, destination) {
        (Container::Backlog, Container::Sprint) => context.active_sprint().map_or(
            Verdict::Rejected(RejectionReason::NoActiveSprint),
            |sprint_id| Verdict::Allowed(PlacementChange::Sprint(Some(sprint_id))),
        ),
        (Container::Sprint, Container::Backlog) => {
            Verdict::Allowed(PlacementChange::Sprint(None))
        }
        (Container::Status(_) | Container::Approvals, Container::Status(status)) => {
            Verdict::Allowed(PlacementChange::Status(status))
        }
        (_, Container::Approvals) => Verdict::Allowed(PlacementChange::Unchanged),
        _ => Verdict::Rejected(RejectionReason::IncompatibleContainers {
            source,
            destination,
        }),
    }
}
