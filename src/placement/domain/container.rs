//! Drop targets and the board context they are computed in.

use super::{ParseContainerError, SprintId, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

const STATUS_PREFIX: &str = "status:";

/// A logical drop target. Containers are computed from task attributes and
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "status")]
pub enum Container {
    /// Product backlog region (no sprint).
    Backlog,
    /// Active sprint region.
    Sprint,
    /// A status column on the board.
    Status(TaskStatus),
    /// Synthetic column holding every Epic task.
    Epic,
    /// Synthetic column holding every Approval task.
    Approvals,
}

impl Container {
    /// Returns `true` for the two sprint-membership regions.
    #[must_use]
    pub const fn is_sprint_region(self) -> bool {
        matches!(self, Self::Backlog | Self::Sprint)
    }

    /// Returns `true` for status columns.
    #[must_use]
    pub const fn is_status_column(self) -> bool {
        matches!(self, Self::Status(_))
    }

    /// Returns the human-readable column title.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Sprint => "Sprint",
            Self::Status(status) => status.label(),
            Self::Epic => "Epic",
            Self::Approvals => "Approvals",
        }
    }

    /// Decodes a droppable identifier.
    ///
    /// `backlog`, `sprint`, `epic` and `approvals` name the synthetic
    /// containers. Anything else is read as a status column, optionally
    /// prefixed with `status:` (required for the `Backlog` status column,
    /// which would otherwise name the backlog region).
    ///
    /// # Errors
    ///
    /// Returns [`ParseContainerError`] for unrecognised identifiers.
    pub fn parse(value: &str) -> Result<Self, ParseContainerError> {
        let trimmed = value.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if let Some(status) = lowered.strip_prefix(STATUS_PREFIX) {
            return TaskStatus::try_from(status)
                .map(Self::Status)
                .map_err(|_| ParseContainerError(value.to_owned()));
        }
        match lowered.as_str() {
            "backlog" => Ok(Self::Backlog),
            "sprint" => Ok(Self::Sprint),
            "epic" | "epics" => Ok(Self::Epic),
            "approval" | "approvals" => Ok(Self::Approvals),
            _ => TaskStatus::try_from(trimmed)
                .map(Self::Status)
                .map_err(|_| ParseContainerError(value.to_owned())),
        }
    }
}

impl fmt::Display for Container {
    /// Writes the droppable identifier accepted by [`Container::parse`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backlog => f.write_str("backlog"),
            Self::Sprint => f.write_str("sprint"),
            Self::Status(status) => write!(f, "{STATUS_PREFIX}{}", status.as_str()),
            Self::Epic => f.write_str("epic"),
            Self::Approvals => f.write_str("approvals"),
        }
    }
}

impl TryFrom<&str> for Container {
    type Error = ParseContainerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Which drop surface is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoardView {
    /// Status columns for the tasks of the active sprint.
    #[default]
    StatusBoard,
    /// Backlog and sprint regions.
    BacklogSplit,
}

/// The context every placement decision is made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SprintContext {
    view: BoardView,
    active_sprint: Option<SprintId>,
}

impl SprintContext {
    /// Creates a context for the given view and active sprint.
    #[must_use]
    pub const fn new(view: BoardView, active_sprint: Option<SprintId>) -> Self {
        Self {
            view,
            active_sprint,
        }
    }

    /// Context for the status board.
    #[must_use]
    pub const fn status_board(active_sprint: Option<SprintId>) -> Self {
        Self::new(BoardView::StatusBoard, active_sprint)
    }

    /// Context for the backlog/sprint split view.
    #[must_use]
    pub const fn backlog_split(active_sprint: Option<SprintId>) -> Self {
        Self::new(BoardView::BacklogSplit, active_sprint)
    }

    /// Returns a copy with a different active sprint.
    #[must_use]
    pub const fn with_active_sprint(self, active_sprint: Option<SprintId>) -> Self {
        Self::new(self.view, active_sprint)
    }

    /// Returns the view.
    #[must_use]
    pub const fn view(&self) -> BoardView {
        self.view
    }

    /// Returns the active sprint, if one is loaded.
    #[must_use]
    pub const fn active_sprint(&self) -> Option<SprintId> {
        self.active_sprint
    }
}
