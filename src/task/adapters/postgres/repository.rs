//! `PostgreSQL` store implementation for task board persistence.

use super::{models::TaskRow, schema::tasks};
use crate::task::{
    domain::{
        PersistedTaskData, Position, PositionUpdate, StaffId, Task, TaskId, TaskKind, TaskStatus,
        TaskTarget, TaskUrgency,
    },
    ports::{PartitionScope, TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::marker::PhantomData;
use tracing::debug;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store for one task domain.
///
/// Every domain shares the `tasks` table and is told apart by its `domain`
/// column. A unit of work takes one transaction-scoped advisory lock per
/// status partition, in scope order, and row-locks tasks it reads by id.
#[derive(Debug)]
pub struct PostgresTaskStore<T: TaskTarget> {
    pool: TaskPgPool,
    _target: PhantomData<fn() -> T>,
}

impl<T: TaskTarget> Clone for PostgresTaskStore<T> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<T: TaskTarget> PostgresTaskStore<T> {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self {
            pool,
            _target: PhantomData,
        }
    }

    async fn run_blocking<F, R>(&self, f: F) -> TaskStoreResult<R>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

/// Failure inside a database transaction, kept apart from the caller's error
/// so Diesel can roll back on either.
enum TxError<E> {
    Work(E),
    Store(TaskStoreError),
}

impl<E> From<DieselError> for TxError<E> {
    fn from(err: DieselError) -> Self {
        Self::Store(TaskStoreError::persistence(err))
    }
}

impl<E: From<TaskStoreError>> TxError<E> {
    fn into_inner(self) -> E {
        match self {
            Self::Work(err) => err,
            Self::Store(err) => E::from(err),
        }
    }
}

fn partition_key(domain: &str, status: TaskStatus) -> String {
    format!("tasks:{domain}:{status}")
}

fn lock_partitions(
    connection: &mut PgConnection,
    domain: &str,
    scope: &PartitionScope,
) -> QueryResult<()> {
    for status in scope.iter() {
        diesel::sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind::<diesel::sql_types::Text, _>(partition_key(domain, status))
            .execute(connection)?;
    }
    Ok(())
}

fn load_partition<T: TaskTarget>(
    connection: &mut PgConnection,
    status: TaskStatus,
) -> TaskStoreResult<Vec<Task<T>>> {
    let rows = tasks::table
        .filter(tasks::domain.eq(T::DOMAIN.as_str()))
        .filter(tasks::status.eq(status.as_str()))
        .order((tasks::position.asc(), tasks::created_at.asc()))
        .select(TaskRow::as_select())
        .load::<TaskRow>(connection)
        .map_err(TaskStoreError::persistence)?;
    rows.into_iter().map(row_to_task).collect()
}

fn load_max_position<T: TaskTarget>(
    connection: &mut PgConnection,
    status: TaskStatus,
) -> TaskStoreResult<Option<Position>> {
    let max = tasks::table
        .filter(tasks::domain.eq(T::DOMAIN.as_str()))
        .filter(tasks::status.eq(status.as_str()))
        .select(diesel::dsl::max(tasks::position))
        .first::<Option<f64>>(connection)
        .map_err(TaskStoreError::persistence)?;
    Ok(max.map(Position::new))
}

/// Unit of work over one open database transaction.
struct PgTaskTransaction<'a, T: TaskTarget> {
    connection: &'a mut PgConnection,
    _target: PhantomData<fn() -> T>,
}

impl<T: TaskTarget> TaskTransaction<T> for PgTaskTransaction<'_, T> {
    fn find_by_id(&mut self, id: TaskId) -> TaskStoreResult<Option<Task<T>>> {
        let row = tasks::table
            .filter(tasks::id.eq(id.into_inner()))
            .filter(tasks::domain.eq(T::DOMAIN.as_str()))
            .select(TaskRow::as_select())
            .for_update()
            .get_result::<TaskRow>(self.connection)
            .optional()
            .map_err(TaskStoreError::persistence)?;
        row.map(row_to_task).transpose()
    }

    fn list_by_status(&mut self, status: TaskStatus) -> TaskStoreResult<Vec<Task<T>>> {
        load_partition(self.connection, status)
    }

    fn max_position(&mut self, status: TaskStatus) -> TaskStoreResult<Option<Position>> {
        load_max_position::<T>(self.connection, status)
    }

    fn insert(&mut self, task: &Task<T>) -> TaskStoreResult<()> {
        let task_id = task.id();
        let row = to_row(task)?;
        diesel::insert_into(tasks::table)
            .values(&row)
            .execute(self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    TaskStoreError::DuplicateTask(task_id)
                }
                _ => TaskStoreError::persistence(err),
            })?;
        Ok(())
    }

    fn update(&mut self, task: &Task<T>) -> TaskStoreResult<()> {
        let row = to_row(task)?;
        let updated = diesel::update(
            tasks::table
                .filter(tasks::id.eq(row.id))
                .filter(tasks::domain.eq(T::DOMAIN.as_str())),
        )
        .set(&row)
        .execute(self.connection)
        .map_err(TaskStoreError::persistence)?;
        if updated == 0 {
            return Err(TaskStoreError::NotFound(task.id()));
        }
        Ok(())
    }

    fn bulk_update_positions(&mut self, updates: &[PositionUpdate]) -> TaskStoreResult<()> {
        for update in updates {
            let updated = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(update.id.into_inner()))
                    .filter(tasks::domain.eq(T::DOMAIN.as_str())),
            )
            .set(tasks::position.eq(update.position.value()))
            .execute(self.connection)
            .map_err(TaskStoreError::persistence)?;
            if updated == 0 {
                return Err(TaskStoreError::NotFound(update.id));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<T: TaskTarget> TaskStore<T> for PostgresTaskStore<T> {
    async fn transact<F, R, E>(&self, scope: PartitionScope, work: F) -> Result<R, E>
    where
        F: FnOnce(&mut dyn TaskTransaction<T>) -> Result<R, E> + Send + 'static,
        R: Send + 'static,
        E: From<TaskStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let mut pooled = pool
                .get()
                .map_err(|err| TxError::Store(TaskStoreError::persistence(err)))?;
            let database: &mut PgConnection = &mut pooled;
            database.transaction::<R, TxError<E>, _>(|connection| {
                lock_partitions(connection, T::DOMAIN.as_str(), &scope)?;
                let mut transaction = PgTaskTransaction::<T> {
                    connection,
                    _target: PhantomData,
                };
                work(&mut transaction).map_err(TxError::Work)
            })
        })
        .await
        .map_err(|err| E::from(TaskStoreError::persistence(err)))?;

        outcome.map_err(|err| {
            if let TxError::Store(ref store_err) = err {
                debug!(error = %store_err, domain = T::DOMAIN.as_str(), "task transaction rolled back");
            }
            err.into_inner()
        })
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task<T>>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::domain.eq(T::DOMAIN.as_str()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskStoreError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_by_status(&self, status: TaskStatus) -> TaskStoreResult<Vec<Task<T>>> {
        self.run_blocking(move |connection| load_partition(connection, status))
            .await
    }

    async fn max_position(&self, status: TaskStatus) -> TaskStoreResult<Option<Position>> {
        self.run_blocking(move |connection| load_max_position::<T>(connection, status))
            .await
    }

    async fn list_by_assignee(&self, staff_id: StaffId) -> TaskStoreResult<Vec<Task<T>>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::domain.eq(T::DOMAIN.as_str()))
                .filter(tasks::assigned_staff_id.eq(staff_id.into_inner()))
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_by_submitter(&self, staff_id: StaffId) -> TaskStoreResult<Vec<Task<T>>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::domain.eq(T::DOMAIN.as_str()))
                .filter(tasks::submitting_staff_id.eq(staff_id.into_inner()))
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn purge_by_status(&self, status: TaskStatus) -> TaskStoreResult<usize> {
        self.run_blocking(move |connection| {
            connection
                .transaction::<usize, DieselError, _>(|connection| {
                    lock_partitions(
                        connection,
                        T::DOMAIN.as_str(),
                        &PartitionScope::single(status),
                    )?;
                    diesel::delete(
                        tasks::table
                            .filter(tasks::domain.eq(T::DOMAIN.as_str()))
                            .filter(tasks::status.eq(status.as_str())),
                    )
                    .execute(connection)
                })
                .map_err(TaskStoreError::persistence)
        })
        .await
    }
}

fn to_row<T: TaskTarget>(task: &Task<T>) -> TaskStoreResult<TaskRow> {
    let target = serde_json::to_value(task.target()).map_err(TaskStoreError::persistence)?;
    let images = serde_json::to_value(task.images()).map_err(TaskStoreError::persistence)?;

    Ok(TaskRow {
        id: task.id().into_inner(),
        domain: T::DOMAIN.as_str().to_owned(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        task_type: task.kind().as_str().to_owned(),
        urgency: task.urgency().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        position: task.position().value(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        due_date: task.due_date(),
        completed_date: task.completed_date(),
        assigned_staff_id: task.assigned_staff_id().map(StaffId::into_inner),
        submitting_staff_id: task.submitting_staff_id().into_inner(),
        target,
        images,
        remarks: task.remarks().map(str::to_owned),
    })
}

fn row_to_task<T: TaskTarget>(row: TaskRow) -> TaskStoreResult<Task<T>> {
    let TaskRow {
        id,
        title,
        description,
        task_type,
        urgency,
        status,
        position,
        created_at,
        updated_at,
        due_date,
        completed_date,
        assigned_staff_id,
        submitting_staff_id,
        target,
        images,
        remarks,
        ..
    } = row;

    let kind = T::Kind::try_from(task_type.as_str()).map_err(TaskStoreError::persistence)?;
    let urgency = TaskUrgency::try_from(urgency.as_str()).map_err(TaskStoreError::persistence)?;
    let status = TaskStatus::try_from(status.as_str()).map_err(TaskStoreError::persistence)?;
    let target = serde_json::from_value::<T>(target).map_err(TaskStoreError::persistence)?;
    let images =
        serde_json::from_value::<Vec<String>>(images).map_err(TaskStoreError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        title,
        description,
        kind,
        urgency,
        status,
        position: Position::new(position),
        created_at,
        updated_at,
        due_date,
        completed_date,
        assigned_staff_id: assigned_staff_id.map(StaffId::from_uuid),
        submitting_staff_id: StaffId::from_uuid(submitting_staff_id),
        target,
        images,
        remarks,
    }))
}
