//! Board ordering for status partitions.
//!
//! Each status column is ordered by a floating-point position. New positions
//! are derived from their neighbours so a drop never renumbers siblings; once
//! neighbours get closer than [`BoardConfig::min_gap`], the partition is
//! rebalanced to evenly spaced positions.

mod config;
mod engine;

pub use config::{BoardConfig, BoardConfigError};
pub use engine::{OrderingEngine, OrderingError};
