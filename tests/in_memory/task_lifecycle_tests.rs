//! Lifecycle flows driven through the service over in-memory adapters.

use chrono::Duration;
use eyre::{Result, ensure};
use parkboard::task::{
    domain::{
        FacilityId, MaintenanceTarget, MaintenanceTaskType, ParkId, PlantTaskType, StaffId,
        StaffMember, StaffRole, TaskStatus, TaskUrgency,
    },
    services::{
        CreateTaskRequest, StatusChangeRequest, TaskLifecycleError, TaskLifecycleErrorKind,
        UpdateTaskDetailsRequest,
    },
};
use rstest::rstest;

use super::helpers::{PARK, Parks, parks};

#[rstest]
#[tokio::test]
async fn task_moves_from_report_to_completion(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let created = parks
        .maintenance
        .create(parks.maintenance_request("Leaking tap").with_description("Block C"))
        .await?;
    ensure!(created.status() == TaskStatus::Open);
    ensure!(created.created_at() == parks.clock.0);
    ensure!(created.due_date() == parks.clock.0 + Duration::days(7));

    let assigned = parks
        .maintenance
        .assign(created.id(), parks.ranger.id())
        .await?;
    ensure!(assigned.status() == TaskStatus::InProgress);
    ensure!(assigned.assigned_staff_id() == Some(parks.ranger.id()));

    let completed = parks
        .maintenance
        .complete(created.id(), parks.ranger.id())
        .await?;
    ensure!(completed.status() == TaskStatus::Completed);
    ensure!(completed.completed_date() == Some(parks.clock.0));
    ensure!(completed.assigned_staff_id() == Some(parks.ranger.id()));

    let stored = parks.maintenance.get(created.id()).await?;
    ensure!(stored == completed);
    ensure!(
        parks
            .maintenance
            .list_by_status(TaskStatus::Open)
            .await?
            .is_empty()
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn completed_task_cannot_be_edited(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let task = parks
        .maintenance
        .create(parks.maintenance_request("Broken bench"))
        .await?;
    parks.maintenance.assign(task.id(), parks.ranger.id()).await?;
    parks
        .maintenance
        .complete(task.id(), parks.ranger.id())
        .await?;

    let result = parks
        .maintenance
        .update_details(
            task.id(),
            UpdateTaskDetailsRequest::new().with_title("Fixed bench"),
        )
        .await;
    ensure!(matches!(result, Err(ref err) if err.kind() == TaskLifecycleErrorKind::InvalidState));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn open_task_edits_keep_due_date_when_urgency_changes(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let task = parks
        .maintenance
        .create(parks.maintenance_request("Flickering light"))
        .await?;

    let edited = parks
        .maintenance
        .update_details(
            task.id(),
            UpdateTaskDetailsRequest::new()
                .with_urgency(TaskUrgency::Immediate)
                .with_target(parks.loose_sensor)
                .with_remarks("spare bulbs in shed"),
        )
        .await?;
    ensure!(edited.urgency() == TaskUrgency::Immediate);
    ensure!(edited.due_date() == task.due_date());
    ensure!(*edited.target() == parks.loose_sensor);
    ensure!(edited.remarks() == Some("spare bulbs in shed"));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn cancelling_requires_an_open_task(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let open = parks
        .maintenance
        .create(parks.maintenance_request("Graffiti"))
        .await?;
    let cancelled = parks.maintenance.cancel(open.id()).await?;
    ensure!(cancelled.status() == TaskStatus::Cancelled);

    let busy = parks
        .maintenance
        .create(parks.maintenance_request("Fallen branch"))
        .await?;
    parks.maintenance.assign(busy.id(), parks.ranger.id()).await?;
    let result = parks.maintenance.cancel(busy.id()).await;
    ensure!(matches!(result, Err(ref err) if err.kind() == TaskLifecycleErrorKind::InvalidState));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn manager_releases_task_held_by_park_staff(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let task = parks
        .maintenance
        .create(parks.maintenance_request("Clogged drain"))
        .await?;
    parks.maintenance.assign(task.id(), parks.ranger.id()).await?;

    let denied = parks
        .maintenance
        .unassign(task.id(), parks.botanist.id())
        .await;
    ensure!(matches!(
        denied,
        Err(TaskLifecycleError::UnassignNotPermitted { .. })
    ));

    let released = parks
        .maintenance
        .unassign(task.id(), parks.manager.id())
        .await?;
    ensure!(released.status() == TaskStatus::Open);
    ensure!(released.assigned_staff_id().is_none());
    ensure!(
        parks
            .maintenance
            .list_assigned_to(parks.ranger.id())
            .await?
            .is_empty()
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn plant_tasks_are_limited_to_plant_roles(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let request = |submitter: StaffId| {
        CreateTaskRequest::new(
            "Water seedlings",
            PlantTaskType::Watering,
            TaskUrgency::High,
            submitter,
        )
        .with_target(parks.occurrence)
    };

    let denied = parks.plants.create(request(parks.ranger.id())).await;
    ensure!(matches!(
        denied,
        Err(ref err) if err.kind() == TaskLifecycleErrorKind::Unauthorized
    ));

    let created = parks.plants.create(request(parks.botanist.id())).await?;
    ensure!(created.due_date() == parks.clock.0 + Duration::days(3));
    let submitted = parks.plants.list_submitted_by(parks.botanist.id()).await?;
    ensure!(submitted.iter().map(|task| task.id()).eq([created.id()]));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn drag_into_progress_requires_an_assignee(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let task = parks
        .maintenance
        .create(parks.maintenance_request("Repaint railings"))
        .await?;

    let missing = parks
        .maintenance
        .update_status(task.id(), StatusChangeRequest::new(TaskStatus::InProgress))
        .await;
    ensure!(matches!(
        missing,
        Err(ref err) if err.kind() == TaskLifecycleErrorKind::InvalidState
    ));

    let stranger = StaffMember::new(StaffId::new(), StaffRole::ParkRanger, Some(PARK));
    let unknown = parks
        .maintenance
        .update_status(
            task.id(),
            StatusChangeRequest::new(TaskStatus::InProgress).with_assignee(stranger.id()),
        )
        .await;
    ensure!(matches!(unknown, Err(TaskLifecycleError::StaffNotFound(_))));

    let moved = parks
        .maintenance
        .update_status(
            task.id(),
            StatusChangeRequest::new(TaskStatus::InProgress).with_assignee(parks.ranger.id()),
        )
        .await?;
    ensure!(moved.assigned_staff_id() == Some(parks.ranger.id()));
    Ok(())
}

#[rstest]
#[case::two_targets(true)]
#[case::unknown_target(false)]
#[tokio::test]
async fn cancelled_task_rejects_edits_before_checking_targets(
    parks: Result<Parks>,
    #[case] two_targets: bool,
) -> Result<()> {
    let parks = parks?;
    let task = parks
        .maintenance
        .create(parks.maintenance_request("Loose paving"))
        .await?;
    parks.maintenance.cancel(task.id()).await?;

    let request = if two_targets {
        UpdateTaskDetailsRequest::new()
            .with_target(parks.facility)
            .with_target(parks.loose_sensor)
    } else {
        UpdateTaskDetailsRequest::new().with_target(MaintenanceTarget::Facility(FacilityId::new()))
    };
    let result = parks.maintenance.update_details(task.id(), request).await;
    ensure!(matches!(
        result,
        Err(ref err) if err.kind() == TaskLifecycleErrorKind::InvalidState
    ));
    let stored = parks.maintenance.get(task.id()).await?;
    ensure!(stored.status() == TaskStatus::Cancelled);
    ensure!(*stored.target() == parks.facility);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn park_listing_resolves_targets_through_directory(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let open = parks
        .maintenance
        .create(parks.maintenance_request("Cracked window"))
        .await?;
    let busy = parks
        .maintenance
        .create(parks.maintenance_request("Stuck gate"))
        .await?;
    parks.maintenance.assign(busy.id(), parks.ranger.id()).await?;
    parks
        .maintenance
        .create(
            CreateTaskRequest::new(
                "Dead sensor",
                MaintenanceTaskType::Inspection,
                TaskUrgency::Low,
                parks.ranger.id(),
            )
            .with_target(parks.loose_sensor),
        )
        .await?;

    let listed = parks.maintenance.list_by_park(PARK).await?;
    ensure!(listed.iter().map(|task| task.id()).eq([open.id(), busy.id()]));
    ensure!(parks.maintenance.list_by_park(ParkId::new(99)).await?.is_empty());
    Ok(())
}
