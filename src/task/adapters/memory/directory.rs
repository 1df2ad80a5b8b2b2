//! In-memory staff and target directories.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{StaffId, StaffMember, TaskTarget},
    ports::{DirectoryError, DirectoryResult, StaffDirectory, TargetDirectory, TargetLocation},
};

fn lock_error<E: std::fmt::Display>(err: E) -> DirectoryError {
    DirectoryError::unavailable(std::io::Error::other(err.to_string()))
}

/// Staff directory backed by a map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStaffDirectory {
    staff: Arc<RwLock<HashMap<StaffId, StaffMember>>>,
}

impl InMemoryStaffDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a staff member.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the map lock is poisoned.
    pub fn insert(&self, member: StaffMember) -> DirectoryResult<()> {
        let mut staff = self.staff.write().map_err(lock_error)?;
        staff.insert(member.id(), member);
        Ok(())
    }
}

#[async_trait]
impl StaffDirectory for InMemoryStaffDirectory {
    async fn find_staff(&self, id: StaffId) -> DirectoryResult<Option<StaffMember>> {
        let staff = self.staff.read().map_err(lock_error)?;
        Ok(staff.get(&id).cloned())
    }
}

/// Target directory backed by a map.
#[derive(Debug)]
pub struct InMemoryTargetDirectory<T: TaskTarget> {
    targets: Arc<RwLock<HashMap<T, TargetLocation>>>,
}

impl<T: TaskTarget> Clone for InMemoryTargetDirectory<T> {
    fn clone(&self) -> Self {
        Self {
            targets: Arc::clone(&self.targets),
        }
    }
}

impl<T: TaskTarget> Default for InMemoryTargetDirectory<T> {
    fn default() -> Self {
        Self {
            targets: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T: TaskTarget> InMemoryTargetDirectory<T> {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `target` at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the map lock is poisoned.
    pub fn insert(&self, target: T, location: TargetLocation) -> DirectoryResult<()> {
        let mut targets = self.targets.write().map_err(lock_error)?;
        targets.insert(target, location);
        Ok(())
    }
}

#[async_trait]
impl<T: TaskTarget> TargetDirectory<T> for InMemoryTargetDirectory<T> {
    async fn locate(&self, target: &T) -> DirectoryResult<Option<TargetLocation>> {
        let targets = self.targets.read().map_err(lock_error)?;
        Ok(targets.get(target).copied())
    }
}
