//! Position allocation inside a unit of work.

use super::error::{TaskLifecycleError, TaskLifecycleResult};
use crate::task::{
    domain::{Position, Task, TaskId, TaskStatus, TaskTarget},
    ordering::OrderingEngine,
    ports::TaskTransaction,
};
use tracing::{debug, info, warn};

/// A locked view of the board for one unit of work.
pub(crate) struct Board<'tx, T: TaskTarget> {
    tx: &'tx mut dyn TaskTransaction<T>,
    engine: OrderingEngine,
}

impl<'tx, T: TaskTarget> Board<'tx, T> {
    pub(crate) fn new(tx: &'tx mut dyn TaskTransaction<T>, engine: OrderingEngine) -> Self {
        Self { tx, engine }
    }

    pub(crate) fn tx(&mut self) -> &mut dyn TaskTransaction<T> {
        &mut *self.tx
    }

    /// Allocates a position in `status` for a task dropped at `index`.
    ///
    /// `moving` is left out of the sibling list so a task being reordered
    /// within its own partition does not count itself. When the neighbours are
    /// too close together the partition is rebalanced and the allocation is
    /// retried, up to the configured number of times.
    pub(crate) fn place(
        &mut self,
        status: TaskStatus,
        moving: Option<TaskId>,
        index: Option<usize>,
    ) -> TaskLifecycleResult<Position> {
        let attempts = self.engine.config().max_rebalance_attempts;
        for attempt in 0..=attempts {
            let siblings: Vec<Task<T>> = self
                .tx
                .list_by_status(status)?
                .into_iter()
                .filter(|task| Some(task.id()) != moving)
                .collect();
            let positions: Vec<Position> = siblings.iter().map(Task::position).collect();

            match self.engine.insert_position(&positions, index) {
                Ok(position) => return Ok(position),
                Err(err) if attempt < attempts => {
                    debug!(%status, error = %err, "partition out of precision");
                    self.rebalance_tasks(status, &siblings)?;
                }
                Err(err) => {
                    warn!(%status, attempts, error = %err, "partition still out of precision");
                }
            }
        }
        Err(TaskLifecycleError::RebalanceExhausted { status, attempts })
    }

    /// Allocates the position after the last task in `status`.
    pub(crate) fn append(&mut self, status: TaskStatus) -> TaskLifecycleResult<Position> {
        let max = self.tx.max_position(status)?;
        match self.engine.append_position(max) {
            Ok(position) => Ok(position),
            Err(_) => self.place(status, None, None),
        }
    }

    /// Respaces every task in `status` evenly, preserving order.
    pub(crate) fn rebalance(&mut self, status: TaskStatus) -> TaskLifecycleResult<Vec<Task<T>>> {
        let partition = self.tx.list_by_status(status)?;
        self.rebalance_tasks(status, &partition)?;
        Ok(self.tx.list_by_status(status)?)
    }

    fn rebalance_tasks(&mut self, status: TaskStatus, ordered: &[Task<T>]) -> TaskLifecycleResult<()> {
        let updates = self.engine.rebalance(ordered.iter().map(Task::id));
        self.tx.bulk_update_positions(&updates)?;
        info!(%status, tasks = updates.len(), "rebalanced partition");
        Ok(())
    }
}
