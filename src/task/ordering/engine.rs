//! Fractional position arithmetic for status partitions.

use super::BoardConfig;
use crate::task::domain::{Position, PositionUpdate, TaskId};
use thiserror::Error;

/// Ordering failures. Never surfaced to callers; the lifecycle service
/// answers them with a rebalance.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OrderingError {
    /// The neighbours around the insertion point are too close together.
    #[error("no room for a position between {previous} and {next}")]
    PrecisionExhausted {
        /// Position before the insertion point, or zero at the front.
        previous: f64,
        /// Position after the insertion point, or the would-be appended one.
        next: f64,
    },
}

/// Computes positions for a partition sorted ascending by position.
///
/// # Examples
///
/// ```
/// use parkboard::task::domain::Position;
/// use parkboard::task::ordering::{BoardConfig, OrderingEngine};
///
/// let engine = OrderingEngine::new(BoardConfig::default());
/// let column = [Position::new(1000.0), Position::new(2000.0)];
/// let front = engine.insert_position(&column, Some(0)).expect("room at the front");
/// assert_eq!(front, Position::new(500.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrderingEngine {
    config: BoardConfig,
}

#[expect(
    clippy::float_arithmetic,
    reason = "fractional midpoints are how positions are allocated"
)]
impl OrderingEngine {
    /// Creates an engine with the given spacing parameters.
    #[must_use]
    pub const fn new(config: BoardConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Position for a task appended after `max`, the largest position in the
    /// partition, or the first position of an empty partition.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::PrecisionExhausted`] when `max` is so large
    /// that adding the gap no longer changes it.
    pub fn append_position(&self, max: Option<Position>) -> Result<Position, OrderingError> {
        let Some(last) = max else {
            return Ok(Position::new(self.config.gap));
        };
        let next = last.value() + self.config.gap;
        if next - last.value() < self.config.min_gap || !next.is_finite() {
            return Err(OrderingError::PrecisionExhausted {
                previous: last.value(),
                next,
            });
        }
        Ok(Position::new(next))
    }

    /// Position for a task dropped at `index` among `siblings`.
    ///
    /// `siblings` must be sorted ascending and must not contain the task being
    /// placed. `None` or an index at or beyond the end appends.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::PrecisionExhausted`] when the new position
    /// would sit closer than `min_gap` to a neighbour.
    pub fn insert_position(
        &self,
        siblings: &[Position],
        index: Option<usize>,
    ) -> Result<Position, OrderingError> {
        let Some(at) = index.filter(|at| *at < siblings.len()) else {
            return self.append_position(siblings.last().copied());
        };

        let next = siblings.get(at).map_or(self.config.gap, |p| p.value());
        let previous = at
            .checked_sub(1)
            .and_then(|before| siblings.get(before))
            .map_or(0.0, |p| p.value());

        let candidate = previous + (next - previous) / 2.0;
        let room = (candidate - previous).min(next - candidate);
        if room < self.config.min_gap {
            return Err(OrderingError::PrecisionExhausted { previous, next });
        }
        Ok(Position::new(candidate))
    }

    /// Evenly spaced positions for `ordered`, preserving its order.
    ///
    /// The task at index `i` receives `(i + 1) * gap`.
    #[must_use]
    pub fn rebalance(&self, ordered: impl IntoIterator<Item = TaskId>) -> Vec<PositionUpdate> {
        let mut next = 0.0;
        ordered
            .into_iter()
            .map(|id| {
                next += self.config.gap;
                PositionUpdate {
                    id,
                    position: Position::new(next),
                }
            })
            .collect()
    }
}
