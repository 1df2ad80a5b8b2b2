//! Port contracts for the task lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod directory;
pub mod repository;

pub use directory::{
    DirectoryError, DirectoryResult, StaffDirectory, TargetDirectory, TargetLocation,
};
pub use repository::{
    PartitionScope, TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction,
};
