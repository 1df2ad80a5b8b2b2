//! Lifecycle controller for task boards.

use super::{
    board::Board,
    error::{TaskLifecycleError, TaskLifecycleResult},
    requests::{CreateTaskRequest, StatusChangeRequest, UpdateTaskDetailsRequest},
};
use crate::task::{
    domain::{
        MaintenanceTarget, NewTaskData, ParkId, PlantTarget, StaffId, StaffMember, Task, TaskId,
        TaskStatus, TaskTarget, exactly_one_target,
    },
    ordering::{BoardConfig, BoardConfigError, OrderingEngine},
    ports::{PartitionScope, StaffDirectory, TargetDirectory, TaskStore, TaskTransaction},
};
use mockable::Clock;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a change applied to a locked task.
pub(crate) enum Step {
    /// The task was changed and must be written.
    Applied,
    /// The task no longer matches what the caller authorized against.
    Stale,
}

/// Pins the closure signature expected by locked updates.
const fn locked_change<T, C, F>(change: F) -> F
where
    T: TaskTarget,
    F: Fn(&mut Task<T>, &mut Board<'_, T>, &C) -> TaskLifecycleResult<Step>,
{
    change
}

enum Locked<R> {
    Done(R),
    Retry(TaskStatus),
}

/// Orchestrates the task state machine, board ordering and authorization
/// for one task domain.
pub struct TaskLifecycleService<T, S, D, L, C>
where
    T: TaskTarget,
    S: TaskStore<T>,
    D: StaffDirectory,
    L: TargetDirectory<T>,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    staff: Arc<D>,
    targets: Arc<L>,
    clock: Arc<C>,
    engine: OrderingEngine,
    _target: PhantomData<fn() -> T>,
}

impl<T, S, D, L, C> Clone for TaskLifecycleService<T, S, D, L, C>
where
    T: TaskTarget,
    S: TaskStore<T>,
    D: StaffDirectory,
    L: TargetDirectory<T>,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            staff: Arc::clone(&self.staff),
            targets: Arc::clone(&self.targets),
            clock: Arc::clone(&self.clock),
            engine: self.engine,
            _target: PhantomData,
        }
    }
}

/// Lifecycle service for maintenance tasks.
pub type MaintenanceTaskService<S, D, L, C> = TaskLifecycleService<MaintenanceTarget, S, D, L, C>;

/// Lifecycle service for plant-care tasks.
pub type PlantTaskService<S, D, L, C> = TaskLifecycleService<PlantTarget, S, D, L, C>;

impl<T, S, D, L, C> TaskLifecycleService<T, S, D, L, C>
where
    T: TaskTarget,
    S: TaskStore<T>,
    D: StaffDirectory,
    L: TargetDirectory<T>,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a service using the default board configuration.
    #[must_use]
    pub fn new(store: Arc<S>, staff: Arc<D>, targets: Arc<L>, clock: Arc<C>) -> Self {
        Self {
            store,
            staff,
            targets,
            clock,
            engine: OrderingEngine::default(),
            _target: PhantomData,
        }
    }

    /// Replaces the board configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BoardConfigError`] when the configuration is unusable.
    pub fn with_config(mut self, config: BoardConfig) -> Result<Self, BoardConfigError> {
        self.engine = OrderingEngine::new(config.validate()?);
        Ok(self)
    }

    /// Returns the board configuration in use.
    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        self.engine.config()
    }

    /// Raises a new task at the end of the `OPEN` column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the submitter or target is unknown,
    /// the submitter may not raise the task, or the input is invalid.
    pub async fn create(&self, request: CreateTaskRequest<T>) -> TaskLifecycleResult<Task<T>> {
        let CreateTaskRequest {
            title,
            description,
            kind,
            urgency,
            due_date,
            targets,
            submitting_staff_id,
            images,
            remarks,
        } = request;

        let submitter = self.require_staff(submitting_staff_id).await?;
        if !T::accepts_submitter(submitter.role()) {
            return Err(TaskLifecycleError::RoleNotPermitted {
                staff_id: submitter.id(),
                role: submitter.role(),
                domain: T::DOMAIN,
            });
        }

        let target = exactly_one_target(&targets)?;
        let location = self
            .targets
            .locate(&target)
            .await?
            .ok_or_else(|| TaskLifecycleError::TargetNotFound(target.to_string()))?;
        if !submitter.has_scope_over(location.park_id) {
            return Err(TaskLifecycleError::OutOfScope {
                staff_id: submitter.id(),
                target: target.to_string(),
            });
        }

        let data = NewTaskData {
            title,
            description,
            kind,
            urgency,
            due_date,
            target,
            submitting_staff_id,
            images,
            remarks,
        };
        let engine = self.engine;
        let clock = Arc::clone(&self.clock);
        let task = self
            .store
            .transact(
                PartitionScope::single(TaskStatus::Open),
                move |tx: &mut dyn TaskTransaction<T>| -> TaskLifecycleResult<Task<T>> {
                    let position = Board::new(tx, engine).append(TaskStatus::Open)?;
                    let task = Task::new(data, position, clock.as_ref())?;
                    tx.insert(&task)?;
                    Ok(task)
                },
            )
            .await?;

        info!(
            task_id = %task.id(),
            domain = T::DOMAIN.as_str(),
            target = %task.target(),
            position = task.position().value(),
            "task created"
        );
        Ok(task)
    }

    /// Assigns an open task to `staff_id` and moves it to `IN_PROGRESS`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task or staff member is
    /// unknown or the task is not open.
    pub async fn assign(&self, task_id: TaskId, staff_id: StaffId) -> TaskLifecycleResult<Task<T>> {
        self.require_staff(staff_id).await?;
        let task = self
            .mutate(task_id, Some(TaskStatus::InProgress), move |task, board, clock| {
                let position = board.place(TaskStatus::InProgress, Some(task.id()), None)?;
                task.assign(staff_id, position, clock)?;
                Ok(Step::Applied)
            })
            .await?;
        info!(%task_id, %staff_id, "task assigned");
        Ok(task)
    }

    /// Releases an in-progress task back to `OPEN`.
    ///
    /// The assignee may always release their own task. Superadmins may
    /// release any task, managers only those held by staff of their own park.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task or requester is unknown,
    /// the requester may not release the task, or the task is not in
    /// progress.
    pub async fn unassign(
        &self,
        task_id: TaskId,
        requester_id: StaffId,
    ) -> TaskLifecycleResult<Task<T>> {
        let requester = self.require_staff(requester_id).await?;
        let attempts = self.engine.config().max_scope_retries;
        for _ in 0..=attempts {
            let observed = self.require_task(task_id).await?;
            let holder = observed.assigned_staff_id();
            if let Some(assignee) = holder {
                self.authorize_release(&requester, task_id, assignee).await?;
            }

            let change = Arc::new(locked_change::<T, C, _>(move |task, board, clock| {
                if task.assigned_staff_id() != holder {
                    return Ok(Step::Stale);
                }
                let position = board.place(TaskStatus::Open, Some(task.id()), None)?;
                task.unassign(position, clock)?;
                Ok(Step::Applied)
            }));
            if let Some(task) = self
                .attempt(&observed, Some(TaskStatus::Open), change)
                .await?
            {
                info!(%task_id, %requester_id, "task unassigned");
                return Ok(task);
            }
        }
        warn!(%task_id, attempts = attempts + 1, "task kept moving under concurrent writers");
        Err(TaskLifecycleError::Contention {
            task_id,
            attempts: attempts + 1,
        })
    }

    /// Completes an in-progress task on behalf of its assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task or staff member is
    /// unknown, the task is not in progress, or `staff_id` is not the
    /// assignee.
    pub async fn complete(
        &self,
        task_id: TaskId,
        staff_id: StaffId,
    ) -> TaskLifecycleResult<Task<T>> {
        self.require_staff(staff_id).await?;
        let task = self
            .mutate(task_id, Some(TaskStatus::Completed), move |task, board, clock| {
                let position = board.place(TaskStatus::Completed, Some(task.id()), None)?;
                task.complete(staff_id, position, clock)?;
                Ok(Step::Applied)
            })
            .await?;
        info!(%task_id, %staff_id, "task completed");
        Ok(task)
    }

    /// Cancels an open task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is unknown or not open.
    pub async fn cancel(&self, task_id: TaskId) -> TaskLifecycleResult<Task<T>> {
        self.update_status(task_id, StatusChangeRequest::new(TaskStatus::Cancelled))
            .await
    }

    /// Moves a task onto a board column, as a drag and drop does.
    ///
    /// With a drop index the task lands at that index among the column's
    /// other tasks; without one it is appended.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task or named assignee is
    /// unknown or the transition is not allowed.
    pub async fn update_status(
        &self,
        task_id: TaskId,
        request: StatusChangeRequest,
    ) -> TaskLifecycleResult<Task<T>> {
        let StatusChangeRequest {
            status,
            target_index,
            assignee,
        } = request;
        if let Some(staff_id) = assignee {
            self.require_staff(staff_id).await?;
        }

        let task = self
            .mutate(task_id, Some(status), move |task, board, clock| {
                let position = board.place(status, Some(task.id()), target_index)?;
                task.move_to(status, assignee, position, clock)?;
                Ok(Step::Applied)
            })
            .await?;
        info!(
            %task_id,
            %status,
            position = task.position().value(),
            "task status updated"
        );
        Ok(task)
    }

    /// Moves a task to `target_index` within its current column.
    ///
    /// The index counts the column's other tasks, so dropping a task on its
    /// own slot leaves the order unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is unknown or the
    /// partition cannot be rebalanced.
    pub async fn reorder(
        &self,
        task_id: TaskId,
        target_index: usize,
    ) -> TaskLifecycleResult<Task<T>> {
        let task = self
            .mutate(task_id, None, move |task, board, clock| {
                let position = board.place(task.status(), Some(task.id()), Some(target_index))?;
                task.reposition(position, clock);
                Ok(Step::Applied)
            })
            .await?;
        debug!(
            %task_id,
            target_index,
            position = task.position().value(),
            "task reordered"
        );
        Ok(task)
    }

    /// Edits a task's fields.
    ///
    /// Completed and cancelled tasks are rejected before the request itself is
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task or replacement target is
    /// unknown, the task is completed or cancelled, or the input is invalid.
    pub async fn update_details(
        &self,
        task_id: TaskId,
        request: UpdateTaskDetailsRequest<T>,
    ) -> TaskLifecycleResult<Task<T>> {
        self.require_task(task_id).await?.ensure_editable()?;
        let change = request.into_change()?;
        if let Some(target) = change.target.as_ref() {
            self.targets
                .locate(target)
                .await?
                .ok_or_else(|| TaskLifecycleError::TargetNotFound(target.to_string()))?;
        }

        let task = self
            .mutate(task_id, None, move |task, _board, clock| {
                task.apply_details(change.clone(), clock)?;
                Ok(Step::Applied)
            })
            .await?;
        info!(%task_id, "task details updated");
        Ok(task)
    }

    /// Fetches a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when the task is unknown.
    pub async fn get(&self, task_id: TaskId) -> TaskLifecycleResult<Task<T>> {
        self.require_task(task_id).await
    }

    /// Lists one board column in display order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the read fails.
    pub async fn list_by_status(&self, status: TaskStatus) -> TaskLifecycleResult<Vec<Task<T>>> {
        Ok(self.store.list_by_status(status).await?)
    }

    /// Lists every task whose target lies in `park_id`, column by column in
    /// board order.
    ///
    /// Targets without a resolvable park, or no longer known to the
    /// directory, are left out.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when a read or directory lookup fails.
    pub async fn list_by_park(&self, park_id: ParkId) -> TaskLifecycleResult<Vec<Task<T>>> {
        let mut parks: HashMap<T, Option<ParkId>> = HashMap::new();
        let mut in_park = Vec::new();
        for status in TaskStatus::ALL {
            for task in self.store.list_by_status(status).await? {
                let park = if let Some(known) = parks.get(task.target()) {
                    *known
                } else {
                    let resolved = self
                        .targets
                        .locate(task.target())
                        .await?
                        .and_then(|location| location.park_id);
                    parks.insert(task.target().clone(), resolved);
                    resolved
                };
                if park == Some(park_id) {
                    in_park.push(task);
                }
            }
        }
        debug!(%park_id, tasks = in_park.len(), "listed park tasks");
        Ok(in_park)
    }

    /// Lists tasks currently held by `staff_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the read fails.
    pub async fn list_assigned_to(&self, staff_id: StaffId) -> TaskLifecycleResult<Vec<Task<T>>> {
        Ok(self.store.list_by_assignee(staff_id).await?)
    }

    /// Lists tasks raised by `staff_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the read fails.
    pub async fn list_submitted_by(
        &self,
        staff_id: StaffId,
    ) -> TaskLifecycleResult<Vec<Task<T>>> {
        Ok(self.store.list_by_submitter(staff_id).await?)
    }

    /// Deletes every task in `status`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the delete fails.
    pub async fn purge_by_status(&self, status: TaskStatus) -> TaskLifecycleResult<usize> {
        let purged = self.store.purge_by_status(status).await?;
        info!(domain = T::DOMAIN.as_str(), %status, purged, "purged tasks");
        Ok(purged)
    }

    /// Respaces a column evenly, preserving its order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the rewrite fails.
    pub async fn rebalance(&self, status: TaskStatus) -> TaskLifecycleResult<Vec<Task<T>>> {
        let engine = self.engine;
        self.store
            .transact(
                PartitionScope::single(status),
                move |tx: &mut dyn TaskTransaction<T>| -> TaskLifecycleResult<Vec<Task<T>>> {
                    Board::new(tx, engine).rebalance(status)
                },
            )
            .await
    }

    async fn require_staff(&self, staff_id: StaffId) -> TaskLifecycleResult<StaffMember> {
        self.staff
            .find_staff(staff_id)
            .await?
            .ok_or(TaskLifecycleError::StaffNotFound(staff_id))
    }

    async fn require_task(&self, task_id: TaskId) -> TaskLifecycleResult<Task<T>> {
        self.store
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(task_id))
    }

    async fn authorize_release(
        &self,
        requester: &StaffMember,
        task_id: TaskId,
        assignee_id: StaffId,
    ) -> TaskLifecycleResult<()> {
        if requester.id() == assignee_id || requester.role().is_elevated() {
            return Ok(());
        }
        if requester.role().is_managerial() {
            let assignee = self.staff.find_staff(assignee_id).await?;
            let same_park = requester.park_id().is_some()
                && assignee.is_some_and(|member| member.park_id() == requester.park_id());
            if same_park {
                return Ok(());
            }
        }
        Err(TaskLifecycleError::UnassignNotPermitted {
            task_id,
            staff_id: requester.id(),
        })
    }

    /// Applies `change` to a task under the locks of its current and
    /// destination partitions, retrying while the task keeps moving.
    async fn mutate<F>(
        &self,
        task_id: TaskId,
        destination: Option<TaskStatus>,
        change: F,
    ) -> TaskLifecycleResult<Task<T>>
    where
        F: Fn(&mut Task<T>, &mut Board<'_, T>, &C) -> TaskLifecycleResult<Step>
            + Send
            + Sync
            + 'static,
    {
        let change = Arc::new(change);
        let attempts = self.engine.config().max_scope_retries;
        for _ in 0..=attempts {
            let observed = self.require_task(task_id).await?;
            if let Some(task) = self
                .attempt(&observed, destination, Arc::clone(&change))
                .await?
            {
                return Ok(task);
            }
        }
        warn!(%task_id, attempts = attempts + 1, "task kept moving under concurrent writers");
        Err(TaskLifecycleError::Contention {
            task_id,
            attempts: attempts + 1,
        })
    }

    /// One locked attempt; `None` means the task moved and the caller should
    /// observe it again.
    async fn attempt<F>(
        &self,
        observed: &Task<T>,
        destination: Option<TaskStatus>,
        change: Arc<F>,
    ) -> TaskLifecycleResult<Option<Task<T>>>
    where
        F: Fn(&mut Task<T>, &mut Board<'_, T>, &C) -> TaskLifecycleResult<Step>
            + Send
            + Sync
            + 'static,
    {
        let task_id = observed.id();
        let scope = PartitionScope::new([
            observed.status(),
            destination.unwrap_or(observed.status()),
        ]);
        let locked = scope.clone();
        let engine = self.engine;
        let clock = Arc::clone(&self.clock);

        let outcome = self
            .store
            .transact(
                scope,
                move |tx: &mut dyn TaskTransaction<T>| -> TaskLifecycleResult<Locked<Task<T>>> {
                    let mut task = tx
                        .find_by_id(task_id)?
                        .ok_or(TaskLifecycleError::TaskNotFound(task_id))?;
                    if !locked.covers(task.status()) {
                        return Ok(Locked::Retry(task.status()));
                    }
                    let mut board = Board::new(tx, engine);
                    match change(&mut task, &mut board, clock.as_ref())? {
                        Step::Applied => {
                            board.tx().update(&task)?;
                            Ok(Locked::Done(task))
                        }
                        Step::Stale => Ok(Locked::Retry(task.status())),
                    }
                },
            )
            .await?;

        match outcome {
            Locked::Done(task) => Ok(Some(task)),
            Locked::Retry(status) => {
                debug!(%task_id, %status, "task changed before its partitions were locked; retrying");
                Ok(None)
            }
        }
    }
}
