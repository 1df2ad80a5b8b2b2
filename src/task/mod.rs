//! Task boards for park operations.
//!
//! Maintenance tasks and plant-care tasks share one lifecycle engine: a state
//! machine over `OPEN`, `IN_PROGRESS`, `COMPLETED` and `CANCELLED`, and a
//! board that orders tasks within each status by fractional positions. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Position arithmetic in [`ordering`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ordering;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
