//! Diesel schema for task board persistence.

diesel::table! {
    /// Task records for every domain sharing the board engine.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Task domain discriminator.
        #[max_length = 20]
        domain -> Varchar,
        /// Short summary.
        title -> Text,
        /// Free-form description.
        description -> Text,
        /// Domain-specific task type.
        #[max_length = 50]
        task_type -> Varchar,
        /// Urgency level.
        #[max_length = 20]
        urgency -> Varchar,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Sort key within the status partition.
        position -> Float8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Due date.
        due_date -> Timestamptz,
        /// Completion timestamp.
        completed_date -> Nullable<Timestamptz>,
        /// Current assignee.
        assigned_staff_id -> Nullable<Uuid>,
        /// Submitting staff member.
        submitting_staff_id -> Uuid,
        /// Tagged target reference.
        target -> Jsonb,
        /// Uploaded image URLs.
        images -> Jsonb,
        /// Optional remarks.
        remarks -> Nullable<Text>,
    }
}
