//! Request payloads accepted by the lifecycle service.

use crate::task::domain::{
    StaffId, TaskDetailsChange, TaskDomainError, TaskStatus, TaskTarget, TaskUrgency,
    at_most_one_target,
};
use chrono::{DateTime, Utc};

/// Request payload for raising a new task.
///
/// Targets are collected as a list so that requests naming no target, or
/// several, can be represented and rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskRequest<T: TaskTarget> {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) kind: T::Kind,
    pub(crate) urgency: TaskUrgency,
    pub(crate) due_date: Option<DateTime<Utc>>,
    pub(crate) targets: Vec<T>,
    pub(crate) submitting_staff_id: StaffId,
    pub(crate) images: Vec<String>,
    pub(crate) remarks: Option<String>,
}

impl<T: TaskTarget> CreateTaskRequest<T> {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        kind: T::Kind,
        urgency: TaskUrgency,
        submitting_staff_id: StaffId,
    ) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            kind,
            urgency,
            due_date: None,
            targets: Vec::new(),
            submitting_staff_id,
            images: Vec::new(),
            remarks: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a target reference.
    #[must_use]
    pub fn with_target(mut self, target: T) -> Self {
        self.targets.push(target);
        self
    }

    /// Overrides the urgency-derived due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets uploaded image URLs.
    #[must_use]
    pub fn with_images(mut self, images: impl IntoIterator<Item = String>) -> Self {
        self.images = images.into_iter().collect();
        self
    }

    /// Sets remarks.
    #[must_use]
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// Returns the submitting staff member.
    #[must_use]
    pub const fn submitting_staff_id(&self) -> StaffId {
        self.submitting_staff_id
    }
}

/// Request payload for editing a task's fields.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTaskDetailsRequest<T: TaskTarget> {
    change: TaskDetailsChange<T>,
    targets: Vec<T>,
}

impl<T: TaskTarget> Default for UpdateTaskDetailsRequest<T> {
    fn default() -> Self {
        Self {
            change: TaskDetailsChange::default(),
            targets: Vec::new(),
        }
    }
}

impl<T: TaskTarget> UpdateTaskDetailsRequest<T> {
    /// Creates a request that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.change.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.change.description = Some(description.into());
        self
    }

    /// Replaces the task type.
    #[must_use]
    pub fn with_kind(mut self, kind: T::Kind) -> Self {
        self.change.kind = Some(kind);
        self
    }

    /// Replaces the urgency. The due date is left as it is.
    #[must_use]
    pub fn with_urgency(mut self, urgency: TaskUrgency) -> Self {
        self.change.urgency = Some(urgency);
        self
    }

    /// Replaces the due date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.change.due_date = Some(due_date);
        self
    }

    /// Adds a replacement target reference.
    #[must_use]
    pub fn with_target(mut self, target: T) -> Self {
        self.targets.push(target);
        self
    }

    /// Replaces the image list.
    #[must_use]
    pub fn with_images(mut self, images: impl IntoIterator<Item = String>) -> Self {
        self.change.images = Some(images.into_iter().collect());
        self
    }

    /// Replaces the remarks.
    #[must_use]
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.change.remarks = Some(remarks.into());
        self
    }

    /// Validates the target list and yields the field edits.
    pub(crate) fn into_change(self) -> Result<TaskDetailsChange<T>, TaskDomainError> {
        let Self { mut change, targets } = self;
        change.target = at_most_one_target(&targets)?;
        Ok(change)
    }
}

/// A drag of a task onto a board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChangeRequest {
    pub(crate) status: TaskStatus,
    pub(crate) target_index: Option<usize>,
    pub(crate) assignee: Option<StaffId>,
}

impl StatusChangeRequest {
    /// Moves the task to the end of `status`.
    #[must_use]
    pub const fn new(status: TaskStatus) -> Self {
        Self {
            status,
            target_index: None,
            assignee: None,
        }
    }

    /// Drops the task at `index` among the destination's other tasks.
    #[must_use]
    pub const fn at_index(mut self, index: usize) -> Self {
        self.target_index = Some(index);
        self
    }

    /// Names the staff member taking the task when it enters `IN_PROGRESS`.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: StaffId) -> Self {
        self.assignee = Some(assignee);
        self
    }
}
