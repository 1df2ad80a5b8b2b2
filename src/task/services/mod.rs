//! Application services for task lifecycle orchestration.

mod board;
mod error;
mod lifecycle;
mod requests;

pub use error::{TaskLifecycleError, TaskLifecycleErrorKind, TaskLifecycleResult};
pub use lifecycle::{MaintenanceTaskService, PlantTaskService, TaskLifecycleService};
pub use requests::{CreateTaskRequest, StatusChangeRequest, UpdateTaskDetailsRequest};
