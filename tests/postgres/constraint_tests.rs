//! `PostgreSQL` integration tests for table-level lifecycle constraints.

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rstest::rstest;
use uuid::Uuid;

use crate::postgres::helpers::{BoxError, PreparedStores, prepared_stores};

/// Inserts a bare maintenance row with the given lifecycle columns.
async fn insert_row(
    stores: &PreparedStores,
    status: &'static str,
    completed: bool,
    assigned: bool,
) -> Result<Result<usize, DieselError>, BoxError> {
    let pool = stores.pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|err| Box::new(err) as BoxError)?;
        Ok(diesel::sql_query(concat!(
            "INSERT INTO tasks (id, domain, title, task_type, urgency, status, position, ",
            "created_at, updated_at, due_date, completed_date, assigned_staff_id, ",
            "submitting_staff_id, target) ",
            "VALUES ($1, 'maintenance', 'Raw row', 'REPAIR', 'NORMAL', $2, 1000, ",
            "NOW(), NOW(), NOW(), CASE WHEN $3 THEN NOW() END, $4, $5, ",
            "'{\"type\": \"facility\", \"id\": \"00000000-0000-0000-0000-000000000001\"}')",
        ))
        .bind::<diesel::sql_types::Uuid, _>(Uuid::new_v4())
        .bind::<diesel::sql_types::Text, _>(status)
        .bind::<diesel::sql_types::Bool, _>(completed)
        .bind::<diesel::sql_types::Nullable<diesel::sql_types::Uuid>, _>(
            assigned.then(Uuid::new_v4),
        )
        .bind::<diesel::sql_types::Uuid, _>(Uuid::new_v4())
        .execute(&mut conn))
    })
    .await
    .map_err(|err| Box::new(err) as BoxError)?
}

#[rstest]
#[case::completed_without_date("COMPLETED", false, true)]
#[case::open_with_date("OPEN", true, false)]
#[case::cancelled_with_date("CANCELLED", true, false)]
#[case::in_progress_without_assignee("IN_PROGRESS", false, false)]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_rejects_rows_breaking_lifecycle_rules(
    #[future] prepared_stores: Result<PreparedStores, BoxError>,
    #[case] status: &'static str,
    #[case] completed: bool,
    #[case] assigned: bool,
) -> Result<(), BoxError> {
    let stores = prepared_stores.await?;

    let result = insert_row(&stores, status, completed, assigned).await?;

    assert!(
        matches!(
            result,
            Err(DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _))
        ),
        "expected a check violation for {status}, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[case::open("OPEN", false, false)]
#[case::in_progress("IN_PROGRESS", false, true)]
#[case::completed("COMPLETED", true, true)]
#[case::cancelled("CANCELLED", false, false)]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_accepts_rows_following_lifecycle_rules(
    #[future] prepared_stores: Result<PreparedStores, BoxError>,
    #[case] status: &'static str,
    #[case] completed: bool,
    #[case] assigned: bool,
) -> Result<(), BoxError> {
    let stores = prepared_stores.await?;

    let inserted = insert_row(&stores, status, completed, assigned).await??;

    assert_eq!(inserted, 1);
    Ok(())
}
