//! Position ranges and shift deltas
//!
//! A `RangeShift` describes "every member of this container whose position
//! falls in this range moves by one". Stores translate it into a single
//! filtered update.

use serde::{Deserialize, Serialize};
use std::ops::{Bound, RangeBounds};
use uuid::Uuid;

/// Zero-based rank of a member inside its container
pub type Position = i32;

/// Half-open or closed interval over positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRange {
    pub lower: Bound<Position>,
    pub upper: Bound<Position>,
}

impl PositionRange {
    pub fn new(lower: Bound<Position>, upper: Bound<Position>) -> Self {
        Self { lower, upper }
    }

    /// Every position strictly greater than `position`
    pub fn above(position: Position) -> Self {
        Self::new(Bound::Excluded(position), Bound::Unbounded)
    }

    /// Every position greater than or equal to `position`
    pub fn at_or_above(position: Position) -> Self {
        Self::new(Bound::Included(position), Bound::Unbounded)
    }

    pub fn contains(&self, position: Position) -> bool {
        (self.lower, self.upper).contains(&position)
    }

    /// Inclusive `(lower, upper)` form, `None` meaning unbounded above
    ///
    /// Used by SQL adapters that bind plain integers.
    pub fn inclusive(&self) -> (Position, Option<Position>) {
        let lower = match self.lower {
            Bound::Included(p) => p,
            Bound::Excluded(p) => p.saturating_add(1),
            Bound::Unbounded => Position::MIN,
        };
        let upper = match self.upper {
            Bound::Included(p) => Some(p),
            Bound::Excluded(p) => Some(p.saturating_sub(1)),
            Bound::Unbounded => None,
        };
        (lower, upper)
    }

    pub fn is_empty(&self) -> bool {
        match self.inclusive() {
            (lower, Some(upper)) => upper < lower,
            (_, None) => false,
        }
    }
}

/// Direction of a range shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftDelta {
    /// `position += 1`, opens a slot
    Up,
    /// `position -= 1`, closes a gap
    Down,
}

impl ShiftDelta {
    pub fn amount(self) -> Position {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// Shift every member of `container_id` whose position is in `range`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeShift {
    pub container_id: Uuid,
    pub range: PositionRange,
    pub delta: ShiftDelta,
}

impl RangeShift {
    /// Position after this shift, if `position` falls in the range
    pub fn shifted(&self, position: Position) -> Option<Position> {
        self.range
            .contains(position)
            .then(|| position + self.delta.amount())
    }
}
