//! Lookup ports for staff and target entities owned by other modules.

use crate::task::domain::{ParkId, StaffId, StaffMember, TaskTarget};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Read access to the staff directory.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    /// Finds a staff member, returning `None` when unknown.
    async fn find_staff(&self, id: StaffId) -> DirectoryResult<Option<StaffMember>>;
}

/// Where a target entity lives, as far as authorization cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetLocation {
    /// Park owning the entity; `None` when it is not installed anywhere yet.
    pub park_id: Option<ParkId>,
}

impl TargetLocation {
    /// Location inside `park_id`.
    #[must_use]
    pub const fn in_park(park_id: ParkId) -> Self {
        Self {
            park_id: Some(park_id),
        }
    }

    /// Location with no owning park.
    #[must_use]
    pub const fn unplaced() -> Self {
        Self { park_id: None }
    }
}

/// Existence and scope lookups for task targets.
#[async_trait]
pub trait TargetDirectory<T: TaskTarget>: Send + Sync {
    /// Resolves the owning park of `target`, returning `None` when the entity
    /// does not exist.
    async fn locate(&self, target: &T) -> DirectoryResult<Option<TargetLocation>>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The backing directory could not be reached.
    #[error("directory unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a backend error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
