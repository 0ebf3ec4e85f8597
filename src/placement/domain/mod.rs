//! Domain model for task placement.
//!
//! Everything here is pure: classification, transition rules and the drag
//! state machine operate on values and never touch the task store or the
//! network.

mod classifier;
mod container;
mod drag;
mod error;
mod failure;
mod ids;
mod sprint;
mod task;
mod transition;

pub use classifier::{classify, is_member};
pub use container::{BoardView, Container, SprintContext};
pub use drag::{DragCoordinator, DragError, DragResolution, DragState, parse_drag_payload};
pub use error::{ParseContainerError, ParseTaskStatusError, PlacementDomainError};
pub use failure::{FailureCategory, PlacementFailure};
pub use ids::{BoardScope, ProjectId, SprintId, TaskId, TemplateType};
pub use sprint::Sprint;
pub use task::{Task, TaskDetails, TaskStatus, TaskType};
pub use transition::{
    PlacementChange, PlacementPolicy, Proposal, RejectionReason, Verdict, validate,
};
