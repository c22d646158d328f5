//! Ordering Module
//!
//! Position maintenance for ordered containers: cards inside a list and
//! lists inside a board. Both use the same rules, so the engine only sees
//! member ids, container ids and integer positions.
//!
//! # Invariants
//!
//! At a quiescent point, the positions inside a container are unique and
//! form the sequence `0, 1, ..., n-1`. Every plan produced here preserves
//! that, provided the container satisfied it before and the caller passed
//! the member's true current position.
//!
//! # Module Structure
//!
//! ```text
//! ordering/
//! ├── mod.rs    - Module exports
//! ├── range.rs  - PositionRange, ShiftDelta, RangeShift
//! ├── plan.rs   - plan_move, plan_append, plan_compaction, in-memory apply
//! └── error.rs  - OrderingError
//! ```

/// Ordering error taxonomy
pub mod error;

/// Position ranges and shift deltas
pub mod range;

/// Move planning
pub mod plan;

pub use error::OrderingError;
pub use plan::{
    apply_plan, apply_shift, is_contiguous, plan_append, plan_compaction, plan_move,
    plan_renumber, MoveKind, MovePlan, MoveRequest, Positioned, TargetUpdate,
};
pub use range::{Position, PositionRange, RangeShift, ShiftDelta};
