//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Task domain discriminator.
    pub domain: String,
    /// Short summary.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Domain-specific task type.
    pub task_type: String,
    /// Urgency level.
    pub urgency: String,
    /// Lifecycle status.
    pub status: String,
    /// Sort key within the status partition.
    pub position: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Due date.
    pub due_date: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_date: Option<DateTime<Utc>>,
    /// Current assignee.
    pub assigned_staff_id: Option<uuid::Uuid>,
    /// Submitting staff member.
    pub submitting_staff_id: uuid::Uuid,
    /// Tagged target JSON payload.
    pub target: Value,
    /// Image URL JSON array.
    pub images: Value,
    /// Optional remarks.
    pub remarks: Option<String>,
}
