//! Parkboard: task lifecycle and ordered boards for park operations.
//!
//! This crate provides the work-item engine behind a parks administration
//! application. Staff raise maintenance tasks against facilities, assets,
//! sensors and hubs, and plant-care tasks against botanical occurrences.
//! Tasks move across a kanban-style board whose columns keep a stable,
//! user-defined order.
//!
//! # Architecture
//!
//! Parkboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and directory lookups
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle, board ordering and persistence

pub mod task;
