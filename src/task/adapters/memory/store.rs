//! In-memory task store with per-partition locking.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::task::{
    domain::{Position, PositionUpdate, StaffId, Task, TaskId, TaskStatus, TaskTarget},
    ports::{PartitionScope, TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction},
};

/// Thread-safe in-memory task store.
///
/// Units of work lock their status partitions in canonical order, stage
/// writes privately and publish them under a single write lock on commit.
#[derive(Debug)]
pub struct InMemoryTaskStore<T: TaskTarget> {
    tasks: Arc<RwLock<HashMap<TaskId, Task<T>>>>,
    partitions: Arc<PartitionLocks>,
}

#[derive(Debug, Default)]
struct PartitionLocks {
    open: Mutex<()>,
    in_progress: Mutex<()>,
    completed: Mutex<()>,
    cancelled: Mutex<()>,
}

impl PartitionLocks {
    const fn for_status(&self, status: TaskStatus) -> &Mutex<()> {
        match status {
            TaskStatus::Open => &self.open,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Completed => &self.completed,
            TaskStatus::Cancelled => &self.cancelled,
        }
    }

    fn acquire(&self, scope: &PartitionScope) -> TaskStoreResult<Vec<MutexGuard<'_, ()>>> {
        scope
            .iter()
            .map(|status| self.for_status(status).lock().map_err(lock_error))
            .collect()
    }
}

impl<T: TaskTarget> Clone for InMemoryTaskStore<T> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            partitions: Arc::clone(&self.partitions),
        }
    }
}

impl<T: TaskTarget> Default for InMemoryTaskStore<T> {
    fn default() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            partitions: Arc::new(PartitionLocks::default()),
        }
    }
}

impl<T: TaskTarget> InMemoryTaskStore<T> {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot<P>(&self, predicate: P) -> TaskStoreResult<Vec<Task<T>>>
    where
        P: Fn(&Task<T>) -> bool,
    {
        let tasks = self.tasks.read().map_err(lock_error)?;
        Ok(tasks.values().filter(|task| predicate(task)).cloned().collect())
    }
}

fn lock_error<E: std::fmt::Display>(err: E) -> TaskStoreError {
    TaskStoreError::persistence(std::io::Error::other(err.to_string()))
}

fn sort_by_position<T: TaskTarget>(tasks: &mut [Task<T>]) {
    tasks.sort_by(|a, b| a.position().value().total_cmp(&b.position().value()));
}

/// Unit of work over the shared map.
struct InMemoryTransaction<'a, T: TaskTarget> {
    tasks: &'a RwLock<HashMap<TaskId, Task<T>>>,
    staged: HashMap<TaskId, Task<T>>,
}

impl<T: TaskTarget> InMemoryTransaction<'_, T> {
    fn exists(&self, id: TaskId) -> TaskStoreResult<bool> {
        if self.staged.contains_key(&id) {
            return Ok(true);
        }
        let tasks = self.tasks.read().map_err(lock_error)?;
        Ok(tasks.contains_key(&id))
    }

    fn commit(self) -> TaskStoreResult<()> {
        let mut tasks = self.tasks.write().map_err(lock_error)?;
        tasks.extend(self.staged);
        Ok(())
    }
}

impl<T: TaskTarget> TaskTransaction<T> for InMemoryTransaction<'_, T> {
    fn find_by_id(&mut self, id: TaskId) -> TaskStoreResult<Option<Task<T>>> {
        if let Some(task) = self.staged.get(&id) {
            return Ok(Some(task.clone()));
        }
        let tasks = self.tasks.read().map_err(lock_error)?;
        Ok(tasks.get(&id).cloned())
    }

    fn list_by_status(&mut self, status: TaskStatus) -> TaskStoreResult<Vec<Task<T>>> {
        let mut partition: Vec<Task<T>> = {
            let tasks = self.tasks.read().map_err(lock_error)?;
            tasks
                .values()
                .filter(|task| !self.staged.contains_key(&task.id()) && task.status() == status)
                .cloned()
                .collect()
        };
        partition.extend(
            self.staged
                .values()
                .filter(|task| task.status() == status)
                .cloned(),
        );
        sort_by_position(&mut partition);
        Ok(partition)
    }

    fn max_position(&mut self, status: TaskStatus) -> TaskStoreResult<Option<Position>> {
        Ok(self
            .list_by_status(status)?
            .last()
            .map(Task::position))
    }

    fn insert(&mut self, task: &Task<T>) -> TaskStoreResult<()> {
        if self.exists(task.id())? {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        self.staged.insert(task.id(), task.clone());
        Ok(())
    }

    fn update(&mut self, task: &Task<T>) -> TaskStoreResult<()> {
        if !self.exists(task.id())? {
            return Err(TaskStoreError::NotFound(task.id()));
        }
        self.staged.insert(task.id(), task.clone());
        Ok(())
    }

    fn bulk_update_positions(&mut self, updates: &[PositionUpdate]) -> TaskStoreResult<()> {
        let mut rewritten = Vec::with_capacity(updates.len());
        for update in updates {
            let mut task = self
                .find_by_id(update.id)?
                .ok_or(TaskStoreError::NotFound(update.id))?;
            task.rebalance_to(update.position);
            rewritten.push(task);
        }
        self.staged
            .extend(rewritten.into_iter().map(|task| (task.id(), task)));
        Ok(())
    }
}

#[async_trait]
impl<T: TaskTarget> TaskStore<T> for InMemoryTaskStore<T> {
    async fn transact<F, R, E>(&self, scope: PartitionScope, work: F) -> Result<R, E>
    where
        F: FnOnce(&mut dyn TaskTransaction<T>) -> Result<R, E> + Send + 'static,
        R: Send + 'static,
        E: From<TaskStoreError> + Send + 'static,
    {
        let _guards = self.partitions.acquire(&scope)?;
        let mut transaction = InMemoryTransaction {
            tasks: &self.tasks,
            staged: HashMap::new(),
        };
        let outcome = work(&mut transaction)?;
        transaction.commit()?;
        Ok(outcome)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task<T>>> {
        let tasks = self.tasks.read().map_err(lock_error)?;
        Ok(tasks.get(&id).cloned())
    }

    async fn list_by_status(&self, status: TaskStatus) -> TaskStoreResult<Vec<Task<T>>> {
        let mut partition = self.snapshot(|task| task.status() == status)?;
        sort_by_position(&mut partition);
        Ok(partition)
    }

    async fn max_position(&self, status: TaskStatus) -> TaskStoreResult<Option<Position>> {
        let partition = self.snapshot(|task| task.status() == status)?;
        Ok(partition
            .iter()
            .map(Task::position)
            .max_by(|a, b| a.value().total_cmp(&b.value())))
    }

    async fn list_by_assignee(&self, staff_id: StaffId) -> TaskStoreResult<Vec<Task<T>>> {
        let mut assigned = self.snapshot(|task| task.assigned_staff_id() == Some(staff_id))?;
        assigned.sort_by_key(Task::created_at);
        Ok(assigned)
    }

    async fn list_by_submitter(&self, staff_id: StaffId) -> TaskStoreResult<Vec<Task<T>>> {
        let mut submitted = self.snapshot(|task| task.submitting_staff_id() == staff_id)?;
        submitted.sort_by_key(Task::created_at);
        Ok(submitted)
    }

    async fn purge_by_status(&self, status: TaskStatus) -> TaskStoreResult<usize> {
        let _guards = self.partitions.acquire(&PartitionScope::single(status))?;
        let mut tasks = self.tasks.write().map_err(lock_error)?;
        let before = tasks.len();
        tasks.retain(|_, task| task.status() != status);
        Ok(before - tasks.len())
    }
}
