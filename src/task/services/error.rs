//! Service-level errors for task lifecycle operations.

use crate::task::{
    domain::{StaffId, StaffRole, TaskDomain, TaskDomainError, TaskId, TaskStatus},
    ports::{DirectoryError, TaskStoreError},
};
use thiserror::Error;

/// Discriminant callers use to map failures onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskLifecycleErrorKind {
    /// A task, staff member or target does not exist.
    NotFound,
    /// The task's status does not allow the operation.
    InvalidState,
    /// The caller's role or ownership fails the gate.
    Unauthorized,
    /// The input is malformed.
    Validation,
    /// Storage or a directory failed.
    Infrastructure,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// No task has the given identifier.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// No staff member has the given identifier.
    #[error("staff {0} not found")]
    StaffNotFound(StaffId),

    /// The referenced target entity does not exist.
    #[error("target {0} not found")]
    TargetNotFound(String),

    /// The submitter's role may not raise tasks in this domain.
    #[error("staff {staff_id} with role {role} may not submit {domain} tasks")]
    RoleNotPermitted {
        /// Submitting staff member.
        staff_id: StaffId,
        /// Their role.
        role: StaffRole,
        /// Domain of the task.
        domain: TaskDomain,
    },

    /// The target lies outside the submitter's park.
    #[error("staff {staff_id} may only raise tasks within their assigned park, not for {target}")]
    OutOfScope {
        /// Submitting staff member.
        staff_id: StaffId,
        /// Rendered target reference.
        target: String,
    },

    /// The requester may not release the task.
    #[error("staff {staff_id} may not unassign task {task_id}")]
    UnassignNotPermitted {
        /// Task being released.
        task_id: TaskId,
        /// Requesting staff member.
        staff_id: StaffId,
    },

    /// A partition kept running out of precision after rebalancing.
    #[error("could not place a task in {status} after {attempts} rebalances")]
    RebalanceExhausted {
        /// Partition being written.
        status: TaskStatus,
        /// Rebalances attempted.
        attempts: u32,
    },

    /// The task kept changing under concurrent writers.
    #[error("task {task_id} changed concurrently {attempts} times; giving up")]
    Contention {
        /// Task being written.
        task_id: TaskId,
        /// Attempts made.
        attempts: u32,
    },

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl TaskLifecycleError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> TaskLifecycleErrorKind {
        match self {
            Self::TaskNotFound(_)
            | Self::StaffNotFound(_)
            | Self::TargetNotFound(_)
            | Self::Store(TaskStoreError::NotFound(_)) => TaskLifecycleErrorKind::NotFound,
            Self::RoleNotPermitted { .. }
            | Self::OutOfScope { .. }
            | Self::UnassignNotPermitted { .. }
            | Self::Domain(TaskDomainError::NotAssignee { .. }) => {
                TaskLifecycleErrorKind::Unauthorized
            }
            Self::Domain(
                TaskDomainError::InvalidStateTransition { .. }
                | TaskDomainError::Immutable { .. }
                | TaskDomainError::Unassigned { .. },
            ) => TaskLifecycleErrorKind::InvalidState,
            Self::Domain(
                TaskDomainError::EmptyTitle
                | TaskDomainError::MissingTarget
                | TaskDomainError::MultipleTargets(_)
                | TaskDomainError::UnknownValue { .. },
            ) => TaskLifecycleErrorKind::Validation,
            Self::RebalanceExhausted { .. }
            | Self::Contention { .. }
            | Self::Store(_)
            | Self::Directory(_) => TaskLifecycleErrorKind::Infrastructure,
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;
