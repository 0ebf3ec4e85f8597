//! JSON wire models for the placement HTTP API.

use crate::placement::domain::{
    ParseTaskStatusError, PlacementDomainError, Sprint, SprintId, Task, TaskDetails, TaskId,
    TaskStatus, TaskType,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while converting wire payloads into domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireDecodeError {
    /// An identifier failed validation.
    #[error(transparent)]
    Domain(#[from] PlacementDomainError),
    /// The status label is not recognised.
    #[error(transparent)]
    Status(#[from] ParseTaskStatusError),
}

/// Task record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    /// Task identifier.
    pub id: u64,
    /// Type label, e.g. `Story` or `Epic`.
    #[serde(rename = "type")]
    pub task_type: String,
    /// Status label, e.g. `In Progress`.
    pub status: String,
    /// Sprint identifier; `null`, missing and `0` all mean "backlog".
    #[serde(default)]
    pub sprint_id: Option<u64>,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Priority label.
    #[serde(default)]
    pub priority: Option<String>,
    /// Assignee.
    #[serde(default)]
    pub assignee: Option<String>,
    /// Reporter.
    #[serde(default)]
    pub reporter: Option<String>,
    /// Due date (`YYYY-MM-DD`).
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Story point estimate.
    #[serde(default)]
    pub story_points: Option<u32>,
    /// Labels.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl TryFrom<TaskPayload> for Task {
    type Error = WireDecodeError;

    fn try_from(payload: TaskPayload) -> Result<Self, Self::Error> {
        let id = TaskId::new(payload.id)?;
        let status = TaskStatus::try_from(payload.status.as_str())?;
        let details = TaskDetails {
            title: payload.title,
            priority: payload.priority,
            assignee: payload.assignee,
            reporter: payload.reporter,
            due_date: payload.due_date,
            story_points: payload.story_points,
            labels: payload.labels,
        };
        Ok(Self::new(id, TaskType::from_label(&payload.task_type), status)
            .with_sprint(SprintId::from_wire(payload.sprint_id))
            .with_details(details))
    }
}

/// Sprint record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintPayload {
    /// Sprint identifier.
    pub id: u64,
    /// Sprint name.
    #[serde(default)]
    pub name: String,
    /// First day.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Goal.
    #[serde(default)]
    pub goal: Option<String>,
}

impl SprintPayload {
    /// Converts the payload, treating a zero id as "no sprint".
    #[must_use]
    pub fn into_sprint(self) -> Option<Sprint> {
        let id = SprintId::from_wire(Some(self.id))?;
        let mut sprint = Sprint::new(id, self.name).with_dates(self.start_date, self.end_date);
        if let Some(goal) = self.goal {
            sprint = sprint.with_goal(goal);
        }
        Some(sprint)
    }
}

/// Body of a status update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateBody<'a> {
    /// Status label.
    pub status: &'static str,
    /// Project template.
    pub template_type: &'a str,
}

/// Body of a sprint assignment request. `sprint_id` serializes as `null`
/// when the task returns to the backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintUpdateBody<'a> {
    /// Target sprint.
    pub sprint_id: Option<u64>,
    /// Project template.
    pub template_type: &'a str,
}
