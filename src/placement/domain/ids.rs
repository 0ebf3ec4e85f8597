//! Identifier and validated scalar types for the placement domain.

use super::PlacementDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positive identifier of a task, stable across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TaskId(u64);

impl TaskId {
    /// Creates a validated task identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::InvalidTaskId`] when the value is zero.
    pub const fn new(value: u64) -> Result<Self, PlacementDomainError> {
        if value == 0 {
            return Err(PlacementDomainError::InvalidTaskId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for TaskId {
    type Error = PlacementDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskId> for u64 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a sprint.
///
/// Zero is the backend's "no sprint" sentinel and is never a valid
/// [`SprintId`]; the absence of a sprint is modelled as `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct SprintId(u64);

impl SprintId {
    /// Creates a validated sprint identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::InvalidSprintId`] when the value is zero.
    pub const fn new(value: u64) -> Result<Self, PlacementDomainError> {
        if value == 0 {
            return Err(PlacementDomainError::InvalidSprintId(value));
        }
        Ok(Self(value))
    }

    /// Normalizes a raw wire value, mapping `None` and `0` to "no sprint".
    #[must_use]
    pub const fn from_wire(value: Option<u64>) -> Option<Self> {
        match value {
            None | Some(0) => None,
            Some(raw) => Some(Self(raw)),
        }
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for SprintId {
    type Error = PlacementDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SprintId> for u64 {
    fn from(id: SprintId) -> Self {
        id.0
    }
}

impl fmt::Display for SprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Positive identifier of the project that owns a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ProjectId(u64);

impl ProjectId {
    /// Creates a validated project identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::InvalidProjectId`] when the value is
    /// zero.
    pub const fn new(value: u64) -> Result<Self, PlacementDomainError> {
        if value == 0 {
            return Err(PlacementDomainError::InvalidProjectId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for ProjectId {
    type Error = PlacementDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProjectId> for u64 {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Project template name sent with every remote placement call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TemplateType(String);

impl TemplateType {
    /// Creates a validated template type.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::EmptyTemplateType`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, PlacementDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PlacementDomainError::EmptyTemplateType);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the template type as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TemplateType {
    type Error = PlacementDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TemplateType> for String {
    fn from(template: TemplateType) -> Self {
        template.0
    }
}

impl AsRef<str> for TemplateType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The project and template a board operates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardScope {
    project_id: ProjectId,
    template_type: TemplateType,
}

impl BoardScope {
    /// Creates a board scope.
    #[must_use]
    pub const fn new(project_id: ProjectId, template_type: TemplateType) -> Self {
        Self {
            project_id,
            template_type,
        }
    }

    /// Creates a board scope from raw values.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError`] when the project id is zero or the
    /// template type is empty.
    pub fn from_parts(
        project_id: u64,
        template_type: impl Into<String>,
    ) -> Result<Self, PlacementDomainError> {
        Ok(Self::new(
            ProjectId::new(project_id)?,
            TemplateType::new(template_type)?,
        ))
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the template type.
    #[must_use]
    pub const fn template_type(&self) -> &TemplateType {
        &self.template_type
    }
}
