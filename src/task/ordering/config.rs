//! Tunable parameters of the board ordering scheme.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Board ordering configuration.
///
/// Positions are spaced `gap` apart when appended or rebalanced. An insertion
/// that would leave less than `min_gap` between the new position and either
/// neighbour is treated as precision exhaustion and triggers a rebalance of
/// the partition.
///
/// # Examples
///
/// ```
/// use parkboard::task::ordering::BoardConfig;
///
/// let config = BoardConfig::default();
/// assert_eq!(config.gap, 1000.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Distance between consecutive positions after an append or rebalance.
    pub gap: f64,
    /// Smallest neighbour distance an insertion may produce.
    pub min_gap: f64,
    /// Rebalances attempted by one operation before giving up.
    pub max_rebalance_attempts: u32,
    /// Retries when a task changes status between the lock-free read and the
    /// locked re-read.
    pub max_scope_retries: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            gap: 1000.0,
            min_gap: 1e-6,
            max_rebalance_attempts: 3,
            max_scope_retries: 3,
        }
    }
}

impl BoardConfig {
    /// Checks that the spacing parameters describe a usable ordering.
    ///
    /// # Errors
    ///
    /// Returns [`BoardConfigError`] when `gap` or `min_gap` is not a positive
    /// finite number or `min_gap` is not smaller than `gap`.
    pub fn validate(self) -> Result<Self, BoardConfigError> {
        if !(self.gap.is_finite() && self.gap > 0.0) {
            return Err(BoardConfigError::InvalidGap(self.gap));
        }
        if !(self.min_gap.is_finite() && self.min_gap > 0.0) {
            return Err(BoardConfigError::InvalidMinGap(self.min_gap));
        }
        if self.min_gap >= self.gap {
            return Err(BoardConfigError::MinGapNotBelowGap {
                gap: self.gap,
                min_gap: self.min_gap,
            });
        }
        Ok(self)
    }
}

/// Rejected board configuration.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BoardConfigError {
    /// `gap` must be positive and finite.
    #[error("gap must be a positive finite number, got {0}")]
    InvalidGap(f64),
    /// `min_gap` must be positive and finite.
    #[error("min_gap must be a positive finite number, got {0}")]
    InvalidMinGap(f64),
    /// `min_gap` must be smaller than `gap`.
    #[error("min_gap {min_gap} must be smaller than gap {gap}")]
    MinGapNotBelowGap {
        /// Configured gap.
        gap: f64,
        /// Configured minimum gap.
        min_gap: f64,
    },
}
