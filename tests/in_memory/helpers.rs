//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use parkboard::task::{
    adapters::memory::{InMemoryStaffDirectory, InMemoryTargetDirectory, InMemoryTaskStore},
    domain::{
        FacilityId, MaintenanceTarget, MaintenanceTaskType, OccurrenceId, ParkId, PlantTarget,
        SensorId, StaffId, StaffMember, StaffRole, TaskUrgency,
    },
    ports::TargetLocation,
    services::{CreateTaskRequest, MaintenanceTaskService, PlantTaskService},
};
use rstest::fixture;

/// Park every fixture target and staff member belongs to.
pub const PARK: ParkId = ParkId::new(7);

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Maintenance service wired to in-memory adapters.
pub type Maintenance = MaintenanceTaskService<
    InMemoryTaskStore<MaintenanceTarget>,
    InMemoryStaffDirectory,
    InMemoryTargetDirectory<MaintenanceTarget>,
    FixedClock,
>;

/// Plant service wired to in-memory adapters.
pub type Plants = PlantTaskService<
    InMemoryTaskStore<PlantTarget>,
    InMemoryStaffDirectory,
    InMemoryTargetDirectory<PlantTarget>,
    FixedClock,
>;

/// Everything a test needs to drive both boards.
pub struct Parks {
    pub maintenance: Maintenance,
    pub plants: Plants,
    pub clock: FixedClock,
    pub manager: StaffMember,
    pub ranger: StaffMember,
    pub botanist: StaffMember,
    pub facility: MaintenanceTarget,
    pub loose_sensor: MaintenanceTarget,
    pub occurrence: PlantTarget,
}

impl Parks {
    /// Builds a maintenance request raised by the ranger against the facility.
    #[must_use]
    pub fn maintenance_request(&self, title: &str) -> CreateTaskRequest<MaintenanceTarget> {
        CreateTaskRequest::new(
            title,
            MaintenanceTaskType::Repair,
            TaskUrgency::Normal,
            self.ranger.id(),
        )
        .with_target(self.facility)
    }
}

/// Provides both boards over fresh in-memory adapters.
///
/// # Errors
///
/// Returns an error if a directory rejects a fixture record.
#[fixture]
pub fn parks() -> eyre::Result<Parks> {
    let instant = Utc
        .with_ymd_and_hms(2024, 1, 1, 8, 30, 0)
        .single()
        .ok_or_else(|| eyre::eyre!("valid fixture timestamp"))?;
    let clock = FixedClock(instant);

    let manager = StaffMember::new(StaffId::new(), StaffRole::Manager, Some(PARK));
    let ranger = StaffMember::new(StaffId::new(), StaffRole::ParkRanger, Some(PARK));
    let botanist = StaffMember::new(StaffId::new(), StaffRole::Botanist, Some(PARK));
    let staff = Arc::new(InMemoryStaffDirectory::new());
    for member in [&manager, &ranger, &botanist] {
        staff.insert(member.clone())?;
    }

    let facility = MaintenanceTarget::Facility(FacilityId::new());
    let loose_sensor = MaintenanceTarget::Sensor(SensorId::new());
    let maintenance_targets = InMemoryTargetDirectory::new();
    maintenance_targets.insert(facility, TargetLocation::in_park(PARK))?;
    maintenance_targets.insert(loose_sensor, TargetLocation::unplaced())?;

    let occurrence = PlantTarget::Occurrence(OccurrenceId::new());
    let plant_targets = InMemoryTargetDirectory::new();
    plant_targets.insert(occurrence, TargetLocation::in_park(PARK))?;

    let clock_handle = Arc::new(clock);
    let maintenance = Maintenance::new(
        Arc::new(InMemoryTaskStore::new()),
        Arc::clone(&staff),
        Arc::new(maintenance_targets),
        Arc::clone(&clock_handle),
    );
    let plants = Plants::new(
        Arc::new(InMemoryTaskStore::new()),
        staff,
        Arc::new(plant_targets),
        clock_handle,
    );

    Ok(Parks {
        maintenance,
        plants,
        clock,
        manager,
        ranger,
        botanist,
        facility,
        loose_sensor,
        occurrence,
    })
}
