//! Default due dates derived from task urgency.

use super::TaskUrgency;
use chrono::{DateTime, TimeDelta, Utc};

/// Maps urgency to the due date used when a submitter leaves it blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueDateCalculator;

impl DueDateCalculator {
    /// Number of days between creation and the default due date.
    #[must_use]
    pub const fn offset_days(urgency: TaskUrgency) -> i64 {
        match urgency {
            TaskUrgency::Immediate => 0,
            TaskUrgency::High => 3,
            TaskUrgency::Normal => 7,
            TaskUrgency::Low => 14,
        }
    }

    /// Returns `created_at` shifted by the urgency offset.
    ///
    /// Saturates at the latest representable instant.
    #[must_use]
    pub fn due_date(created_at: DateTime<Utc>, urgency: TaskUrgency) -> DateTime<Utc> {
        TimeDelta::try_days(Self::offset_days(urgency))
            .and_then(|offset| created_at.checked_add_signed(offset))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
