//! Derives the container a task currently belongs to.

use super::{BoardView, Container, SprintContext, Task};

/// Maps a task to its container in the given context.
///
/// Returns `None` when the task is not part of the drop surface for this
/// view: on the status board that is every task outside the active sprint,
/// on the backlog split it is every task assigned to some other sprint.
/// Epic and Approval tasks are classified by type alone.
#[must_use]
pub fn classify(task: &Task, context: &SprintContext) -> Option<Container> {
    if task.is_epic() {
        return Some(Container::Epic);
    }
    if task.is_approval() {
        return Some(Container::Approvals);
    }

    let in_active_sprint = task.sprint_id().is_some() && task.sprint_id() == context.active_sprint();
    match context.view() {
        BoardView::StatusBoard => in_active_sprint.then_some(Container::Status(task.status())),
        BoardView::BacklogSplit => match task.sprint_id() {
            None => Some(Container::Backlog),
            Some(_) if in_active_sprint => Some(Container::Sprint),
            Some(_) => None,
        },
    }
}

/// Returns `true` when `task` is classified into `container`.
#[must_use]
pub fn is_member(task: &Task, container: Container, context: &SprintContext) -> bool {
    classify(task, context) == Some(container)
}
