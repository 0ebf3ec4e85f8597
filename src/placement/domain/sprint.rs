//! Sprint metadata supplied by the backend.

use super::SprintId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A sprint. Read-only from the placement engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    id: SprintId,
    name: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    goal: Option<String>,
}

impl Sprint {
    /// Creates a sprint with no dates or goal.
    #[must_use]
    pub fn new(id: SprintId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            start_date: None,
            end_date: None,
            goal: None,
        }
    }

    /// Sets the date range.
    #[must_use]
    pub const fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Sets the sprint goal.
    #[must_use]
    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    /// Returns the sprint identifier.
    #[must_use]
    pub const fn id(&self) -> SprintId {
        self.id
    }

    /// Returns the sprint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the first day of the sprint.
    #[must_use]
    pub const fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Returns the last day of the sprint.
    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Returns the sprint goal.
    #[must_use]
    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }
}
