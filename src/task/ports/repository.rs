//! Store port for task persistence and board ordering.

use crate::task::domain::{
    Position, PositionUpdate, StaffId, Task, TaskId, TaskStatus, TaskTarget,
};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Set of status partitions locked by one unit of work.
///
/// Statuses are kept sorted so every adapter acquires locks in the same
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartitionScope(BTreeSet<TaskStatus>);

impl PartitionScope {
    /// Scope covering the given statuses.
    #[must_use]
    pub fn new(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        Self(statuses.into_iter().collect())
    }

    /// Scope covering a single status.
    #[must_use]
    pub fn single(status: TaskStatus) -> Self {
        Self::new([status])
    }

    /// Returns whether `status` is locked by this scope.
    #[must_use]
    pub fn covers(&self, status: TaskStatus) -> bool {
        self.0.contains(&status)
    }

    /// Iterates the locked statuses in lock order.
    pub fn iter(&self) -> impl Iterator<Item = TaskStatus> + '_ {
        self.0.iter().copied()
    }
}

/// Reads and writes available inside one unit of work.
///
/// Reads observe the unit's own earlier writes. Nothing becomes visible to
/// other readers until the unit commits.
pub trait TaskTransaction<T: TaskTarget> {
    /// Reads a task, locking its row until the unit ends.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the read fails.
    fn find_by_id(&mut self, id: TaskId) -> TaskStoreResult<Option<Task<T>>>;

    /// Lists one status partition in ascending position order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the read fails.
    fn list_by_status(&mut self, status: TaskStatus) -> TaskStoreResult<Vec<Task<T>>>;

    /// Returns the largest position in a partition, or `None` when empty.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] when the read fails.
    fn max_position(&mut self, status: TaskStatus) -> TaskStoreResult<Option<Position>>;

    /// Stages a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the identifier exists.
    fn insert(&mut self, task: &Task<T>) -> TaskStoreResult<()>;

    /// Stages changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    fn update(&mut self, task: &Task<T>) -> TaskStoreResult<()>;

    /// Stages new positions for several tasks at once.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when any task does not exist; no
    /// position is changed in that case.
    fn bulk_update_positions(&mut self, updates: &[PositionUpdate]) -> TaskStoreResult<()>;
}

/// Task persistence contract for one task domain.
#[async_trait]
pub trait TaskStore<T: TaskTarget>: Send + Sync {
    /// Runs `work` as one unit of work holding exclusive locks on every
    /// partition in `scope`.
    ///
    /// The unit commits when `work` returns `Ok` and rolls back otherwise.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a [`TaskStoreError`] converted
    /// into `E` when the unit cannot start or commit.
    async fn transact<F, R, E>(&self, scope: PartitionScope, work: F) -> Result<R, E>
    where
        F: FnOnce(&mut dyn TaskTransaction<T>) -> Result<R, E> + Send + 'static,
        R: Send + 'static,
        E: From<TaskStoreError> + Send + 'static;

    /// Finds a task by identifier without locking.
    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task<T>>>;

    /// Lists one status partition in ascending position order.
    async fn list_by_status(&self, status: TaskStatus) -> TaskStoreResult<Vec<Task<T>>>;

    /// Returns the largest position in a partition, or `None` when empty.
    async fn max_position(&self, status: TaskStatus) -> TaskStoreResult<Option<Position>>;

    /// Lists tasks currently assigned to `staff_id`.
    async fn list_by_assignee(&self, staff_id: StaffId) -> TaskStoreResult<Vec<Task<T>>>;

    /// Lists tasks raised by `staff_id`.
    async fn list_by_submitter(&self, staff_id: StaffId) -> TaskStoreResult<Vec<Task<T>>>;

    /// Deletes every task in `status`, returning how many were removed.
    async fn purge_by_status(&self, status: TaskStatus) -> TaskStoreResult<usize>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
