//! Task entity and the attributes that drive placement.

use super::{ParseTaskStatusError, PlacementChange, SprintId, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work item. Placement rules depend on it and it never changes
/// through a placement move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// User story.
    Story,
    /// Defect report.
    Bug,
    /// Plain task.
    Task,
    /// Epic grouping other work; pinned to the Epic container.
    Epic,
    /// Generic issue.
    Issue,
    /// Approval request; lives in the Approvals container.
    Approval,
    /// Any type the backend reports that is not modelled explicitly.
    Other,
}

impl TaskType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Bug => "bug",
            Self::Task => "task",
            Self::Epic => "epic",
            Self::Issue => "issue",
            Self::Approval => "approval",
            Self::Other => "other",
        }
    }

    /// Decodes a backend type label. Unknown labels map to [`Self::Other`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "story" => Self::Story,
            "bug" => Self::Bug,
            "task" => Self::Task,
            "epic" => Self::Epic,
            "issue" => Self::Issue,
            "approval" => Self::Approval,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet planned.
    Backlog,
    /// Planned, not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Awaiting review.
    Review,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Every status in board column order.
    pub const ALL: [Self; 5] = [
        Self::Backlog,
        Self::Todo,
        Self::InProgress,
        Self::Review,
        Self::Done,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    /// Returns the column label used by the backend and the board.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    /// Accepts labels (`In Progress`), storage values (`in_progress`) and
    /// slugs (`in-progress`), ignoring case.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
            .map(|ch| ch.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::Todo),
            "inprogress" => Ok(Self::InProgress),
            "review" | "inreview" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Descriptive attributes carried with a task. None of them take part in
/// placement decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    /// Task title.
    pub title: String,
    /// Priority label as reported by the backend.
    pub priority: Option<String>,
    /// Assignee display name or handle.
    pub assignee: Option<String>,
    /// Reporter display name or handle.
    pub reporter: Option<String>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Story point estimate.
    pub story_points: Option<u32>,
    /// Free-form labels.
    pub labels: Vec<String>,
}

impl TaskDetails {
    /// Creates details with only a title set.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// The unit of placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    task_type: TaskType,
    status: TaskStatus,
    sprint_id: Option<SprintId>,
    details: TaskDetails,
}

impl Task {
    /// Creates a backlog task with empty details.
    #[must_use]
    pub fn new(id: TaskId, task_type: TaskType, status: TaskStatus) -> Self {
        Self {
            id,
            task_type,
            status,
            sprint_id: None,
            details: TaskDetails::default(),
        }
    }

    /// Sets the sprint membership.
    #[must_use]
    pub const fn with_sprint(mut self, sprint_id: Option<SprintId>) -> Self {
        self.sprint_id = sprint_id;
        self
    }

    /// Sets the descriptive attributes.
    #[must_use]
    pub fn with_details(mut self, details: TaskDetails) -> Self {
        self.details = details;
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task type.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the sprint the task belongs to, or `None` for the backlog.
    #[must_use]
    pub const fn sprint_id(&self) -> Option<SprintId> {
        self.sprint_id
    }

    /// Returns the descriptive attributes.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns `true` for Epic tasks.
    #[must_use]
    pub const fn is_epic(&self) -> bool {
        matches!(self.task_type, TaskType::Epic)
    }

    /// Returns `true` for Approval tasks.
    #[must_use]
    pub const fn is_approval(&self) -> bool {
        matches!(self.task_type, TaskType::Approval)
    }

    /// Writes a placement change into the task. Only `status` and
    /// `sprint_id` are ever touched.
    pub(crate) const fn apply_change(&mut self, change: PlacementChange) {
        match change {
            PlacementChange::Unchanged => {}
            PlacementChange::Status(status) => self.status = status,
            PlacementChange::Sprint(sprint_id) => self.sprint_id = sprint_id,
        }
    }
}
