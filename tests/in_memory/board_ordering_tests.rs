//! Board ordering behaviour observed through the service.

use std::sync::Arc;

use eyre::{Result, ensure};
use parkboard::task::{
    adapters::memory::{InMemoryStaffDirectory, InMemoryTargetDirectory, InMemoryTaskStore},
    domain::{MaintenanceTarget, Position, Task, TaskId, TaskStatus},
    ordering::BoardConfig,
    ports::TargetLocation,
    services::{StatusChangeRequest, TaskLifecycleError},
};
use rstest::rstest;

use super::helpers::{Maintenance, PARK, Parks, parks};

async fn raise(parks: &Parks, titles: &[&str]) -> Result<Vec<TaskId>> {
    let mut ids = Vec::with_capacity(titles.len());
    for title in titles {
        ids.push(parks.maintenance.create(parks.maintenance_request(title)).await?.id());
    }
    Ok(ids)
}

async fn column(service: &Maintenance, status: TaskStatus) -> Result<Vec<String>> {
    Ok(service
        .list_by_status(status)
        .await?
        .iter()
        .map(|task| task.title().to_owned())
        .collect())
}

fn positions(tasks: &[Task<MaintenanceTarget>]) -> Vec<Position> {
    tasks.iter().map(Task::position).collect()
}

#[rstest]
#[tokio::test]
async fn drops_across_columns_land_at_the_requested_index(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let ids = raise(&parks, &["A", "B", "C", "D"]).await?;
    let [a, b, c, d] = ids.as_slice() else {
        eyre::bail!("four tasks raised");
    };

    parks.maintenance.assign(*a, parks.ranger.id()).await?;
    parks.maintenance.assign(*b, parks.ranger.id()).await?;
    parks
        .maintenance
        .update_status(
            *c,
            StatusChangeRequest::new(TaskStatus::InProgress)
                .at_index(1)
                .with_assignee(parks.manager.id()),
        )
        .await?;
    ensure!(column(&parks.maintenance, TaskStatus::InProgress).await? == ["A", "C", "B"]);

    parks
        .maintenance
        .update_status(
            *a,
            StatusChangeRequest::new(TaskStatus::Open).at_index(0),
        )
        .await?;
    ensure!(column(&parks.maintenance, TaskStatus::Open).await? == ["A", "D"]);
    ensure!(column(&parks.maintenance, TaskStatus::InProgress).await? == ["C", "B"]);

    parks.maintenance.reorder(*d, 0).await?;
    ensure!(column(&parks.maintenance, TaskStatus::Open).await? == ["D", "A"]);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn dropping_a_task_on_its_own_slot_keeps_the_order(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let ids = raise(&parks, &["A", "B", "C"]).await?;
    let b = ids.get(1).copied().ok_or_else(|| eyre::eyre!("B raised"))?;

    parks.maintenance.reorder(b, 1).await?;
    ensure!(column(&parks.maintenance, TaskStatus::Open).await? == ["A", "B", "C"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reports_get_distinct_positions(parks: Result<Parks>) -> Result<()> {
    let parks = Arc::new(parks?);
    let mut handles = Vec::new();
    for n in 0..16 {
        let shared = Arc::clone(&parks);
        handles.push(tokio::spawn(async move {
            shared
                .maintenance
                .create(shared.maintenance_request(&format!("Report {n}")))
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let open = parks.maintenance.list_by_status(TaskStatus::Open).await?;
    let spaced: Vec<Position> = (1..=16)
        .map(|step| Position::new(f64::from(step) * 1000.0))
        .collect();
    ensure!(positions(&open) == spaced, "positions: {:?}", positions(&open));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn crowded_column_is_respaced_before_the_drop(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let staff = Arc::new(InMemoryStaffDirectory::new());
    staff.insert(parks.ranger.clone())?;
    let targets = Arc::new(InMemoryTargetDirectory::new());
    targets.insert(parks.facility, TargetLocation::in_park(PARK))?;
    let service = Maintenance::new(
        Arc::new(InMemoryTaskStore::new()),
        staff,
        targets,
        Arc::new(parks.clock),
    )
    .with_config(BoardConfig {
        min_gap: 300.0,
        ..BoardConfig::default()
    })?;

    let mut ids = Vec::new();
    for title in ["A", "B", "C", "D"] {
        ids.push(service.create(parks.maintenance_request(title)).await?.id());
    }
    let [_, _, c, d] = ids.as_slice() else {
        eyre::bail!("four tasks raised");
    };

    service.reorder(*d, 1).await?;
    ensure!(column(&service, TaskStatus::Open).await? == ["A", "D", "B", "C"]);

    // 1250 would sit closer than 300 to A at 1000.
    service.reorder(*c, 1).await?;
    let open = service.list_by_status(TaskStatus::Open).await?;
    ensure!(column(&service, TaskStatus::Open).await? == ["A", "C", "D", "B"]);
    ensure!(
        positions(&open)
            == [1000.0, 1500.0, 2000.0, 3000.0]
                .into_iter()
                .map(Position::new)
                .collect::<Vec<_>>(),
        "positions: {:?}",
        positions(&open)
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn manual_rebalance_restores_even_spacing(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let ids = raise(&parks, &["A", "B", "C"]).await?;
    let c = ids.last().copied().ok_or_else(|| eyre::eyre!("C raised"))?;
    parks.maintenance.reorder(c, 0).await?;
    parks.maintenance.reorder(c, 1).await?;

    let respaced = parks.maintenance.rebalance(TaskStatus::Open).await?;
    ensure!(
        respaced.iter().map(Task::title).eq(["A", "C", "B"]),
        "order changed by rebalance"
    );
    ensure!(
        positions(&respaced)
            == [1000.0, 2000.0, 3000.0]
                .into_iter()
                .map(Position::new)
                .collect::<Vec<_>>()
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn purge_clears_only_the_named_column(parks: Result<Parks>) -> Result<()> {
    let parks = parks?;
    let ids = raise(&parks, &["A", "B", "C"]).await?;
    let a = ids.first().copied().ok_or_else(|| eyre::eyre!("A raised"))?;
    parks.maintenance.assign(a, parks.ranger.id()).await?;

    let purged = parks.maintenance.purge_by_status(TaskStatus::Open).await?;
    ensure!(purged == 2);
    ensure!(column(&parks.maintenance, TaskStatus::Open).await?.is_empty());
    ensure!(column(&parks.maintenance, TaskStatus::InProgress).await? == ["A"]);

    let gone = parks
        .maintenance
        .get(ids.get(1).copied().ok_or_else(|| eyre::eyre!("B raised"))?)
        .await;
    ensure!(matches!(gone, Err(TaskLifecycleError::TaskNotFound(_))));
    Ok(())
}
