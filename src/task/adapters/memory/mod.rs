//! In-memory adapters for tests and local tooling.

mod directory;
mod store;

pub use directory::{InMemoryStaffDirectory, InMemoryTargetDirectory};
pub use store::InMemoryTaskStore;
