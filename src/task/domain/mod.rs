//! Domain model for park work items.
//!
//! Maintenance tasks and plant-care tasks share one aggregate, [`Task`],
//! parameterized by the target reference type of each domain. Everything in
//! this module is free of infrastructure concerns.

mod due_date;
mod error;
mod ids;
mod kind;
mod staff;
mod status;
mod target;
mod task;

pub use due_date::DueDateCalculator;
pub use error::TaskDomainError;
pub use ids::{ParkId, StaffId, TaskId};
pub use kind::{MaintenanceTaskType, PlantTaskType, TaskKind};
pub use staff::{StaffMember, StaffRole};
pub use status::{TaskStatus, TaskUrgency};
pub use target::{
    FacilityId, HubId, MaintenanceTarget, OccurrenceId, ParkAssetId, PlantTarget, SensorId,
    TaskDomain, TaskTarget, at_most_one_target, exactly_one_target,
};
pub use task::{
    NewTaskData, PersistedTaskData, Position, PositionUpdate, Task, TaskDetailsChange,
};

/// Task raised against a facility, asset, sensor or hub.
pub type MaintenanceTask = Task<MaintenanceTarget>;

/// Task raised against a plant occurrence.
pub type PlantTask = Task<PlantTarget>;
