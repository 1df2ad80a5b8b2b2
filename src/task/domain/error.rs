//! Error types for task domain validation and lifecycle rules.

use super::{StaffId, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned by task construction and lifecycle transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// No target entity was referenced.
    #[error("exactly one target reference must be provided, found none")]
    MissingTarget,

    /// More than one target entity was referenced.
    #[error("exactly one target reference must be provided, found {0}")]
    MultipleTargets(usize),

    /// A stored or submitted enum value could not be parsed.
    #[error("unknown {field} value: {value}")]
    UnknownValue {
        /// Name of the field being parsed.
        field: &'static str,
        /// The rejected raw value.
        value: String,
    },

    /// The requested status change is not part of the lifecycle.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidStateTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// Completed and cancelled tasks reject field edits.
    #[error("task {task_id} is {status} and can no longer be edited")]
    Immutable {
        /// Task being edited.
        task_id: TaskId,
        /// Terminal status the task is in.
        status: TaskStatus,
    },

    /// The status requires an assignee but the task has none.
    #[error("task {task_id} must be assigned before moving to {to}")]
    Unassigned {
        /// Task being transitioned.
        task_id: TaskId,
        /// Requested status.
        to: TaskStatus,
    },

    /// Only the assignee may perform the operation.
    #[error("staff {staff_id} is not the assignee of task {task_id}")]
    NotAssignee {
        /// Task being operated on.
        task_id: TaskId,
        /// Staff member who attempted the operation.
        staff_id: StaffId,
    },
}

impl TaskDomainError {
    pub(crate) fn unknown(field: &'static str, value: &str) -> Self {
        Self::UnknownValue {
            field,
            value: value.to_owned(),
        }
    }
}
