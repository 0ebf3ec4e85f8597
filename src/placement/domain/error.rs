//! Error types for placement domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing placement domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlacementDomainError {
    /// The task identifier is zero.
    #[error("invalid task id {0}, expected a positive integer")]
    InvalidTaskId(u64),

    /// The sprint identifier is zero.
    #[error("invalid sprint id {0}, expected a positive integer")]
    InvalidSprintId(u64),

    /// The project identifier is zero.
    #[error("invalid project id {0}, expected a positive integer")]
    InvalidProjectId(u64),

    /// The template type is empty after trimming.
    #[error("template type must not be empty")]
    EmptyTemplateType,

    /// A drag payload could not be decoded into a task identifier.
    #[error("malformed drag payload '{0}'")]
    MalformedDragPayload(String),
}

/// Error returned while parsing task statuses from wire or storage values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing a droppable container identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown container: {0}")]
pub struct ParseContainerError(pub String);
