//! Shared fixtures for task unit tests.

use crate::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{
        FacilityId, MaintenanceTarget, MaintenanceTaskType, NewTaskData, ParkId, Position,
        StaffId, StaffMember, StaffRole, Task, TaskDomainError, TaskUrgency,
    },
    ports::{DirectoryResult, StaffDirectory, TargetDirectory, TargetLocation},
    services::TaskLifecycleService,
};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32) -> Self {
        let instant = Utc
            .with_ymd_and_hms(year, month, day, 9, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

mockall::mock! {
    pub Staff {}

    #[async_trait]
    impl StaffDirectory for Staff {
        async fn find_staff(&self, id: StaffId) -> DirectoryResult<Option<StaffMember>>;
    }
}

mockall::mock! {
    pub Targets {}

    #[async_trait]
    impl TargetDirectory<MaintenanceTarget> for Targets {
        async fn locate(
            &self,
            target: &MaintenanceTarget,
        ) -> DirectoryResult<Option<TargetLocation>>;
    }
}

pub type MockedService = TaskLifecycleService<
    MaintenanceTarget,
    InMemoryTaskStore<MaintenanceTarget>,
    MockStaff,
    MockTargets,
    FixedClock,
>;

pub const HOME_PARK: ParkId = ParkId::new(1);
pub const OTHER_PARK: ParkId = ParkId::new(2);

pub fn member(role: StaffRole, park: Option<ParkId>) -> StaffMember {
    StaffMember::new(StaffId::new(), role, park)
}

pub fn facility() -> MaintenanceTarget {
    MaintenanceTarget::Facility(FacilityId::new())
}

pub fn new_task_data(title: &str, urgency: TaskUrgency) -> NewTaskData<MaintenanceTarget> {
    NewTaskData {
        title: title.to_owned(),
        description: String::new(),
        kind: MaintenanceTaskType::Inspection,
        urgency,
        due_date: None,
        target: facility(),
        submitting_staff_id: StaffId::new(),
        images: Vec::new(),
        remarks: None,
    }
}

pub fn open_task(
    title: &str,
    position: f64,
    clock: &FixedClock,
) -> Result<Task<MaintenanceTarget>, TaskDomainError> {
    Task::new(
        new_task_data(title, TaskUrgency::Normal),
        Position::new(position),
        clock,
    )
}
