//! Task aggregate root and its lifecycle transitions.

use super::{
    DueDateCalculator, StaffId, TaskDomainError, TaskId, TaskStatus, TaskTarget, TaskUrgency,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Sort key of a task inside its status partition.
///
/// Positions are only comparable between tasks sharing a status.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(f64);

impl Position {
    /// Wraps a raw sort key.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Returns the raw sort key.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

/// New sort key for one task, as written by a bulk position rewrite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionUpdate {
    /// Task being moved.
    pub id: TaskId,
    /// Its new sort key.
    pub position: Position,
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTaskData<T: TaskTarget> {
    /// Short summary.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Task type within the domain.
    pub kind: T::Kind,
    /// Urgency, which drives the default due date.
    pub urgency: TaskUrgency,
    /// Explicit due date; derived from urgency when absent.
    pub due_date: Option<DateTime<Utc>>,
    /// The single entity the task is about.
    pub target: T,
    /// Staff member raising the task.
    pub submitting_staff_id: StaffId,
    /// Uploaded image URLs.
    pub images: Vec<String>,
    /// Optional remarks.
    pub remarks: Option<String>,
}

/// Field edits applied to a non-terminal task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetailsChange<T: TaskTarget> {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement task type.
    pub kind: Option<T::Kind>,
    /// Replacement urgency.
    pub urgency: Option<TaskUrgency>,
    /// Replacement due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Replacement target.
    pub target: Option<T>,
    /// Replacement image list.
    pub images: Option<Vec<String>>,
    /// Replacement remarks.
    pub remarks: Option<String>,
}

impl<T: TaskTarget> Default for TaskDetailsChange<T> {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            kind: None,
            urgency: None,
            due_date: None,
            target: None,
            images: None,
            remarks: None,
        }
    }
}

/// Task aggregate root, parameterized by its target reference type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: TaskTarget", deserialize = "T: TaskTarget"))]
pub struct Task<T: TaskTarget> {
    id: TaskId,
    title: String,
    description: String,
    kind: T::Kind,
    urgency: TaskUrgency,
    status: TaskStatus,
    position: Position,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    due_date: DateTime<Utc>,
    completed_date: Option<DateTime<Utc>>,
    assigned_staff_id: Option<StaffId>,
    submitting_staff_id: StaffId,
    target: T,
    images: Vec<String>,
    remarks: Option<String>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData<T: TaskTarget> {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted task type.
    pub kind: T::Kind,
    /// Persisted urgency.
    pub urgency: TaskUrgency,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted sort key.
    pub position: Position,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted due date.
    pub due_date: DateTime<Utc>,
    /// Persisted completion timestamp.
    pub completed_date: Option<DateTime<Utc>>,
    /// Persisted assignee.
    pub assigned_staff_id: Option<StaffId>,
    /// Persisted submitter.
    pub submitting_staff_id: StaffId,
    /// Persisted target reference.
    pub target: T,
    /// Persisted image URLs.
    pub images: Vec<String>,
    /// Persisted remarks.
    pub remarks: Option<String>,
}

impl<T: TaskTarget> Task<T> {
    /// Creates an open task at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn new(
        data: NewTaskData<T>,
        position: Position,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let title = normalize_title(data.title)?;
        let timestamp = clock.utc();
        let due_date = data
            .due_date
            .unwrap_or_else(|| DueDateCalculator::due_date(timestamp, data.urgency));

        Ok(Self {
            id: TaskId::new(),
            title,
            description: data.description,
            kind: data.kind,
            urgency: data.urgency,
            status: TaskStatus::Open,
            position,
            created_at: timestamp,
            updated_at: timestamp,
            due_date,
            completed_date: None,
            assigned_staff_id: None,
            submitting_staff_id: data.submitting_staff_id,
            target: data.target,
            images: data.images,
            remarks: data.remarks,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData<T>) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            kind: data.kind,
            urgency: data.urgency,
            status: data.status,
            position: data.position,
            created_at: data.created_at,
            updated_at: data.updated_at,
            due_date: data.due_date,
            completed_date: data.completed_date,
            assigned_staff_id: data.assigned_staff_id,
            submitting_staff_id: data.submitting_staff_id,
            target: data.target,
            images: data.images,
            remarks: data.remarks,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the task type.
    #[must_use]
    pub const fn kind(&self) -> T::Kind {
        self.kind
    }

    /// Returns the urgency.
    #[must_use]
    pub const fn urgency(&self) -> TaskUrgency {
        self.urgency
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the sort key within the status partition.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    /// Returns the completion timestamp; set only while completed.
    #[must_use]
    pub const fn completed_date(&self) -> Option<DateTime<Utc>> {
        self.completed_date
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assigned_staff_id(&self) -> Option<StaffId> {
        self.assigned_staff_id
    }

    /// Returns the submitter.
    #[must_use]
    pub const fn submitting_staff_id(&self) -> StaffId {
        self.submitting_staff_id
    }

    /// Returns the target reference.
    #[must_use]
    pub const fn target(&self) -> &T {
        &self.target
    }

    /// Returns the uploaded image URLs.
    #[must_use]
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Returns the remarks, if any.
    #[must_use]
    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }

    /// Takes an open task and starts work on it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// open.
    pub fn assign(
        &mut self,
        staff_id: StaffId,
        position: Position,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.require_status(TaskStatus::Open, TaskStatus::InProgress)?;
        self.assigned_staff_id = Some(staff_id);
        self.enter(TaskStatus::InProgress, position, clock);
        Ok(())
    }

    /// Returns an in-progress task to the open column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// in progress.
    pub fn unassign(
        &mut self,
        position: Position,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.require_status(TaskStatus::InProgress, TaskStatus::Open)?;
        self.assigned_staff_id = None;
        self.enter(TaskStatus::Open, position, clock);
        Ok(())
    }

    /// Marks an in-progress task as completed by its assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// in progress, or [`TaskDomainError::NotAssignee`] when `staff_id` is not
    /// the assignee.
    pub fn complete(
        &mut self,
        staff_id: StaffId,
        position: Position,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.require_status(TaskStatus::InProgress, TaskStatus::Completed)?;
        if self.assigned_staff_id != Some(staff_id) {
            return Err(TaskDomainError::NotAssignee {
                task_id: self.id,
                staff_id,
            });
        }
        self.enter(TaskStatus::Completed, position, clock);
        Ok(())
    }

    /// Moves the task to `status` at `position`, as a board drag does.
    ///
    /// Moving into the current status only repositions the task. Moving into
    /// `InProgress` needs an assignee, either already set or supplied;
    /// completing needs an existing assignee; reopening clears the assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] for transitions
    /// outside the lifecycle, or [`TaskDomainError::Unassigned`] when the
    /// destination requires an assignee.
    pub fn move_to(
        &mut self,
        status: TaskStatus,
        assignee: Option<StaffId>,
        position: Position,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if status == self.status {
            self.reposition(position, clock);
            return Ok(());
        }
        if !self.status.can_transition_to(status) {
            return Err(self.invalid_transition(status));
        }

        match status {
            TaskStatus::InProgress => {
                let staff_id = assignee
                    .or(self.assigned_staff_id)
                    .ok_or(TaskDomainError::Unassigned {
                        task_id: self.id,
                        to: status,
                    })?;
                self.assigned_staff_id = Some(staff_id);
            }
            TaskStatus::Completed => {
                if self.assigned_staff_id.is_none() {
                    return Err(TaskDomainError::Unassigned {
                        task_id: self.id,
                        to: status,
                    });
                }
            }
            TaskStatus::Open => self.assigned_staff_id = None,
            TaskStatus::Cancelled => {}
        }

        self.enter(status, position, clock);
        Ok(())
    }

    /// Changes the sort key without changing status.
    pub fn reposition(&mut self, position: Position, clock: &impl Clock) {
        self.position = position;
        self.touch(clock);
    }

    /// Overwrites the sort key during a partition rebalance.
    ///
    /// Rebalancing is bookkeeping and leaves `updated_at` untouched.
    pub const fn rebalance_to(&mut self, position: Position) {
        self.position = position;
    }

    /// Applies field edits.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Immutable`] for completed or cancelled
    /// tasks, or [`TaskDomainError::EmptyTitle`] for a blank replacement
    /// title.
    pub fn apply_details(
        &mut self,
        change: TaskDetailsChange<T>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_editable()?;
        let title = change.title.map(normalize_title).transpose()?;

        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(description) = change.description {
            self.description = description;
        }
        if let Some(kind) = change.kind {
            self.kind = kind;
        }
        if let Some(urgency) = change.urgency {
            self.urgency = urgency;
        }
        if let Some(due_date) = change.due_date {
            self.due_date = due_date;
        }
        if let Some(target) = change.target {
            self.target = target;
        }
        if let Some(images) = change.images {
            self.images = images;
        }
        if let Some(remarks) = change.remarks {
            self.remarks = Some(remarks);
        }
        self.touch(clock);
        Ok(())
    }

    /// Fails when the task is in a terminal status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Immutable`] for completed or cancelled
    /// tasks.
    pub const fn ensure_editable(&self) -> Result<(), TaskDomainError> {
        if self.status.is_terminal() {
            return Err(TaskDomainError::Immutable {
                task_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    fn require_status(&self, expected: TaskStatus, to: TaskStatus) -> Result<(), TaskDomainError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(self.invalid_transition(to))
        }
    }

    const fn invalid_transition(&self, to: TaskStatus) -> TaskDomainError {
        TaskDomainError::InvalidStateTransition {
            task_id: self.id,
            from: self.status,
            to,
        }
    }

    fn enter(&mut self, status: TaskStatus, position: Position, clock: &impl Clock) {
        let timestamp = clock.utc();
        self.status = status;
        self.position = position;
        self.completed_date = (status == TaskStatus::Completed).then_some(timestamp);
        self.updated_at = timestamp;
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn normalize_title(title: String) -> Result<String, TaskDomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    if trimmed.len() == title.len() {
        Ok(title)
    } else {
        Ok(trimmed.to_owned())
    }
}
